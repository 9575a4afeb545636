// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use super::{init_queue, request, Reply, StubHttpSend};
use azstore_core::{
    DecodeResponse, ErrorKind, QueueConfig, QueueResponse, RequestInfo, ResponseKind, Result,
};
use bytes::Bytes;
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_document_response() {
    let stub = StubHttpSend::new(|_| {
        Reply::ok("<EnumerationResults><Blobs><Blob/><Blob/></Blobs></EnumerationResults>")
    });
    let queue = init_queue(&stub, QueueConfig::default());

    let doc = queue.submit(request("/c?comp=list")).document().await.unwrap();
    assert_eq!(doc.name, "EnumerationResults");
    assert!(doc.get_child("Blobs").is_some());
}

#[tokio::test]
async fn test_malformed_document() {
    let stub = StubHttpSend::new(|_| Reply::ok("<EnumerationResults><Blobs>"));
    let queue = init_queue(&stub, QueueConfig::default());

    let err = queue.submit(request("/c")).document().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecodingFailed);
}

#[tokio::test]
async fn test_truncated_body() {
    let stub = StubHttpSend::new(|_| {
        Reply::ok(vec![b'x'; 40]).with_header("content-length", "100")
    });
    let queue = init_queue(&stub, QueueConfig::default());

    let err = queue.submit(request("/c/b")).data().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TruncatedResponse);
}

#[tokio::test]
async fn test_head_ignores_content_length() {
    let stub = StubHttpSend::new(|_| Reply::ok("").with_header("content-length", "100"));
    let queue = init_queue(&stub, QueueConfig::default());

    let mut req = request("/c/b");
    *req.method_mut() = Method::HEAD;
    queue.submit(req).no_response().await.unwrap();
}

#[tokio::test]
async fn test_service_error_keeps_status_and_body() {
    let stub = StubHttpSend::new(|_| {
        Reply::status(StatusCode::NOT_FOUND)
            .with_body("<Error><Code>BlobNotFound</Code></Error>")
    });
    let queue = init_queue(&stub, QueueConfig::default());

    let err = queue.submit(request("/c/missing")).data().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServiceError);
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert!(err.message().contains("BlobNotFound"));
}

#[tokio::test]
async fn test_redirect_loop() {
    let stub = StubHttpSend::new(|_| Reply::redirect(StatusCode::FOUND, "/loop"));
    let queue = init_queue(&stub, QueueConfig::default().with_max_redirects(3));

    let err = queue.submit(request("/start")).no_response().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RedirectLoop);
    assert_eq!(stub.seen().len(), 4);
}

#[tokio::test]
async fn test_redirect_to_other_host_drops_credentials() {
    let stub = StubHttpSend::new(|req| match req.uri().host() {
        Some("acct.blob.core.windows.net") => Reply::redirect(
            StatusCode::TEMPORARY_REDIRECT,
            "https://mirror.blob.core.windows.net/c/b",
        ),
        _ => Reply::ok("moved"),
    });
    let queue = init_queue(&stub, QueueConfig::default());

    let mut req = request("/c/b");
    req.headers_mut()
        .insert("authorization", "SharedKey acct:sig".parse().unwrap());
    let body = queue.submit(req).data().await.unwrap();

    assert_eq!(body.as_ref(), b"moved");
    let seen = stub.seen();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].headers.contains_key("authorization"));
    assert!(!seen[1].headers.contains_key("authorization"));
    assert_eq!(seen[1].headers["x-ms-version"], "2013-08-15");
}

#[tokio::test]
async fn test_see_other_switches_to_get() {
    let stub = StubHttpSend::new(|req| match *req.method() {
        Method::PUT => Reply::redirect(StatusCode::SEE_OTHER, "/status"),
        _ => Reply::ok("<Status/>"),
    });
    let queue = init_queue(&stub, QueueConfig::default());

    let mut req = request("/c/b");
    *req.method_mut() = Method::PUT;
    *req.body_mut() = Bytes::from_static(b"payload");
    queue.submit(req).document().await.unwrap();

    let methods: Vec<_> = stub.seen().into_iter().map(|s| s.method).collect();
    assert_eq!(methods, vec![Method::PUT, Method::GET]);
    assert_eq!(stub.seen_paths(), vec!["/c/b", "/status"]);
}

struct BlobNames;

impl DecodeResponse for BlobNames {
    type Output = Vec<String>;

    fn kind(&self) -> ResponseKind {
        ResponseKind::Document
    }

    fn decode(&self, request: &RequestInfo, response: QueueResponse) -> Result<Vec<String>> {
        assert_eq!(request.uri.path(), "/c");
        let doc = response.into_document()?;
        Ok(doc
            .get_child("Blobs")
            .map(|blobs| {
                blobs
                    .children
                    .iter()
                    .filter_map(|n| n.as_element())
                    .filter_map(|b| b.get_child("Name"))
                    .filter_map(|n| n.get_text())
                    .map(|t| t.to_string())
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[tokio::test]
async fn test_decoded_response() {
    let stub = StubHttpSend::new(|_| {
        Reply::ok(
            "<EnumerationResults><Blobs>\
             <Blob><Name>a.txt</Name></Blob>\
             <Blob><Name>b.txt</Name></Blob>\
             </Blobs></EnumerationResults>",
        )
    });
    let queue = init_queue(&stub, QueueConfig::default());

    let names = queue.submit(request("/c")).decoded(BlobNames).await.unwrap();
    assert_eq!(names, vec!["a.txt".to_string(), "b.txt".to_string()]);
}
