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

use crate::{Credential, StorageType};
use azstore_core::{Error, Result};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderName, HeaderValue, Method, Uri};

#[derive(Debug, Clone)]
enum Target {
    Endpoint(String),
    Url(String),
}

/// StorageRequest describes a logical storage operation before it is signed.
///
/// ```
/// use azstore_storage::{Credential, RequestSigner, StorageRequest, StorageType};
///
/// let cred = Credential::with_account_key("acct", "a2V5LWZvci10ZXN0cy1vbmx5");
/// let req = StorageRequest::new("images/cat.txt", StorageType::Blob)
///     .method(http::Method::PUT)
///     .header("x-ms-blob-type", "BlockBlob")
///     .body("meow", "text/plain");
///
/// let signed = RequestSigner::new().authenticated_request(&cred, req).unwrap();
/// assert!(signed.headers().contains_key("authorization"));
/// ```
#[derive(Debug, Clone)]
pub struct StorageRequest {
    target: Target,
    storage_type: StorageType,
    method: Method,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
    content_type: Option<String>,
}

impl StorageRequest {
    /// Address an endpoint relative to the service url of the credential.
    pub fn new(endpoint: impl Into<String>, storage_type: StorageType) -> Self {
        Self::with_target(Target::Endpoint(endpoint.into()), storage_type)
    }

    /// Address an explicit url, like a blob url returned by a listing.
    pub fn with_url(url: impl Into<String>, storage_type: StorageType) -> Self {
        Self::with_target(Target::Url(url.into()), storage_type)
    }

    fn with_target(target: Target, storage_type: StorageType) -> Self {
        Self {
            target,
            storage_type,
            method: Method::GET,
            headers: Vec::new(),
            body: None,
            content_type: None,
        }
    }

    /// Set the HTTP method, `GET` by default.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Use the `MERGE` method of the table service.
    pub fn merge(self) -> Self {
        self.method(Method::from_bytes(b"MERGE").expect("MERGE is a valid method"))
    }

    /// Add a header, a later value for the same name wins.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a body with its content type.
    pub fn body(mut self, body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.content_type = Some(content_type.into());
        self
    }

    /// Storage type this request is addressed to.
    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    /// Resolve the url and build the unsigned request.
    pub fn build(self, cred: &Credential) -> Result<http::Request<Bytes>> {
        let uri = match &self.target {
            Target::Endpoint(endpoint) => cred.url_for_endpoint(endpoint, self.storage_type)?,
            Target::Url(url) => url
                .parse::<Uri>()
                .map_err(|e| Error::from(e).with_context(format!("url: {url}")))?,
        };

        let mut req = http::Request::new(self.body.clone().unwrap_or_default());
        *req.method_mut() = self.method.clone();
        *req.uri_mut() = uri;
        req.extensions_mut().insert(self.storage_type);

        let headers = req.headers_mut();
        for (name, value) in &self.headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        match &self.body {
            Some(body) => {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
                if let Some(ct) = &self.content_type {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_str(ct)?);
                }
            }
            None if matches!(self.method.as_str(), "PUT" | "POST" | "MERGE") => {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(0usize));
            }
            None => {}
        }

        Ok(req)
    }
}
