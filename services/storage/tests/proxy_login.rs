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

use crate::{init_logger, StubHttpSend};
use azstore_core::{Context, Error, ErrorKind, Result, Signer};
use azstore_storage::{
    AuthenticationDelegate, Config, ConfigCredentialProvider, Credential,
    ProxyLoginCredentialProvider, RequestSigner,
};
use bytes::Bytes;
use http::StatusCode;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

const PROXY_URL: &str = "https://proxy.example.com/login";

const LOGIN_RESPONSE: &str = r#"<LoginResponse>
  <Token>session-token</Token>
  <TableServiceUrl>https://proxy.example.com/tables</TableServiceUrl>
  <BlobServiceUrl>https://proxy.example.com/blobs</BlobServiceUrl>
  <QueueServiceUrl>https://proxy.example.com/queues</QueueServiceUrl>
</LoginResponse>"#;

fn context(stub: &StubHttpSend) -> Context {
    Context::new().with_http_send(stub.clone())
}

#[tokio::test]
async fn test_login() -> Result<()> {
    init_logger();

    let stub = StubHttpSend::new(StatusCode::OK, LOGIN_RESPONSE);
    let provider = ProxyLoginCredentialProvider::new(PROXY_URL, "alice", "s3cret");

    let cred = provider.login(&context(&stub)).await?;
    assert_eq!(
        cred,
        Credential::with_proxy_session(
            PROXY_URL,
            "session-token",
            "https://proxy.example.com/tables",
            "https://proxy.example.com/blobs",
        )
        .with_queue_service_url("https://proxy.example.com/queues")
    );

    let seen = stub.last();
    assert_eq!(seen.method, http::Method::POST);
    assert_eq!(seen.uri, PROXY_URL);
    assert_eq!(seen.headers["content-type"], "application/xml");
    assert_eq!(
        seen.body,
        "<Login><UserName>alice</UserName><Password>s3cret</Password></Login>"
    );
    Ok(())
}

#[tokio::test]
async fn test_configured_urls_win() -> Result<()> {
    let stub = StubHttpSend::new(StatusCode::OK, LOGIN_RESPONSE);
    let provider = ProxyLoginCredentialProvider::new(PROXY_URL, "alice", "s3cret")
        .with_table_service_url("https://tables.internal")
        .with_blob_service_url("https://blobs.internal");

    let cred = provider.login(&context(&stub)).await?;
    let Credential::ProxySession {
        table_service_url,
        blob_service_url,
        queue_service_url,
        ..
    } = cred
    else {
        panic!("expected a proxy session");
    };
    assert_eq!(table_service_url, "https://tables.internal");
    assert_eq!(blob_service_url, "https://blobs.internal");
    assert_eq!(
        queue_service_url.as_deref(),
        Some("https://proxy.example.com/queues")
    );
    Ok(())
}

#[tokio::test]
async fn test_rejected_login() {
    let stub = StubHttpSend::new(StatusCode::UNAUTHORIZED, "<Error>bad password</Error>");
    let provider = ProxyLoginCredentialProvider::new(PROXY_URL, "alice", "wrong");

    let err = provider.login(&context(&stub)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(err.message().contains("bad password"));
}

#[tokio::test]
async fn test_malformed_response() {
    let stub = StubHttpSend::new(StatusCode::OK, "<LoginResponse><Token>abc</Nope></LoginResponse>");
    let provider = ProxyLoginCredentialProvider::new(PROXY_URL, "alice", "s3cret");

    let err = provider.login(&context(&stub)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
}

#[tokio::test]
async fn test_non_utf8_response() {
    let stub = StubHttpSend::with_bytes(StatusCode::OK, Bytes::from_static(&[0xff, 0xfe, 0x3c]));
    let provider = ProxyLoginCredentialProvider::new(PROXY_URL, "alice", "s3cret");

    let err = provider.login(&context(&stub)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
    assert!(err.to_string().contains(PROXY_URL));
}

#[tokio::test]
async fn test_response_without_token() {
    let stub = StubHttpSend::new(
        StatusCode::OK,
        "<LoginResponse><TableServiceUrl>https://t</TableServiceUrl><BlobServiceUrl>https://b</BlobServiceUrl></LoginResponse>",
    );
    let provider = ProxyLoginCredentialProvider::new(PROXY_URL, "alice", "s3cret");

    let err = provider.login(&context(&stub)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
}

#[tokio::test]
async fn test_missing_service_url() {
    let stub = StubHttpSend::new(
        StatusCode::OK,
        "<LoginResponse><Token>abc</Token><BlobServiceUrl>https://b</BlobServiceUrl></LoginResponse>",
    );
    let provider = ProxyLoginCredentialProvider::new(PROXY_URL, "alice", "s3cret");

    let err = provider.login(&context(&stub)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}

#[test]
fn test_login_blocking() -> Result<()> {
    let stub = StubHttpSend::new(StatusCode::OK, LOGIN_RESPONSE);
    let provider = ProxyLoginCredentialProvider::new(PROXY_URL, "alice", "s3cret");

    let cred = provider.login_blocking(&context(&stub))?;
    assert_eq!(cred.token(), Some("session-token"));
    Ok(())
}

#[tokio::test]
async fn test_login_with_callback() {
    let stub = StubHttpSend::new(StatusCode::FORBIDDEN, "");
    let provider = ProxyLoginCredentialProvider::new(PROXY_URL, "alice", "s3cret");

    let (tx, rx) = tokio::sync::oneshot::channel();
    provider.login_with_callback(&context(&stub), move |res| {
        let _ = tx.send(res.map_err(|e| e.kind()));
    });

    assert_eq!(rx.await.unwrap(), Err(ErrorKind::AuthenticationFailed));
}

#[derive(Default)]
struct RecordingDelegate {
    events: Mutex<Vec<String>>,
}

impl AuthenticationDelegate for RecordingDelegate {
    fn login_did_succeed(&self, credential: &Credential) {
        let token = credential.token().unwrap_or_default().to_string();
        self.events.lock().unwrap().push(format!("ok:{token}"));
    }

    fn login_did_fail(&self, error: &Error) {
        self.events
            .lock()
            .unwrap()
            .push(format!("err:{:?}", error.kind()));
    }
}

#[tokio::test]
async fn test_login_with_delegate() {
    let delegate = Arc::new(RecordingDelegate::default());

    let ok = StubHttpSend::new(StatusCode::OK, LOGIN_RESPONSE);
    ProxyLoginCredentialProvider::new(PROXY_URL, "alice", "s3cret")
        .login_with_delegate(&context(&ok), delegate.clone())
        .await
        .unwrap();

    let failed = StubHttpSend::new(StatusCode::UNAUTHORIZED, "");
    ProxyLoginCredentialProvider::new(PROXY_URL, "alice", "wrong")
        .login_with_delegate(&context(&failed), delegate.clone())
        .await
        .unwrap();

    assert_eq!(
        *delegate.events.lock().unwrap(),
        vec![
            "ok:session-token".to_string(),
            "err:AuthenticationFailed".to_string()
        ]
    );
}

#[tokio::test]
async fn test_signer_logs_in_once() -> Result<()> {
    init_logger();

    let stub = StubHttpSend::new(StatusCode::OK, LOGIN_RESPONSE);
    let config = Config {
        proxy_url: Some(PROXY_URL.to_string()),
        proxy_username: Some("alice".to_string()),
        proxy_password: Some("s3cret".to_string()),
        ..Default::default()
    };
    let signer = Signer::new(
        context(&stub),
        ConfigCredentialProvider::new(config.clone()),
        RequestSigner::from_config(&config),
    );

    for _ in 0..2 {
        let mut parts = http::Request::get("https://proxy.example.com/blobs/images")
            .body(())?
            .into_parts()
            .0;
        signer.sign(&mut parts, None).await?;
        assert_eq!(parts.headers["authtoken"], "session-token");
    }

    assert_eq!(stub.calls(), 1);
    Ok(())
}
