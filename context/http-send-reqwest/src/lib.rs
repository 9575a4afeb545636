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

//! [`HttpSend`] implementation backed by [`reqwest`].
//!
//! ```no_run
//! use azstore_core::Context;
//! use azstore_http_send_reqwest::ReqwestHttpSend;
//! use std::time::Duration;
//!
//! let client = reqwest::Client::builder()
//!     .timeout(Duration::from_secs(30))
//!     .redirect(reqwest::redirect::Policy::none())
//!     .build()
//!     .unwrap();
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));
//! ```

#![warn(missing_docs)]

use async_trait::async_trait;
use azstore_core::{Error, HttpSend, Result};
use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http_body_util::BodyExt;
use log::debug;
use reqwest::{redirect, Client, Request};

/// ReqwestHttpSend sends requests with a [`reqwest::Client`].
///
/// The request queue follows redirects itself, so a client passed to
/// [`ReqwestHttpSend::new`] should be built with [`redirect::Policy::none`].
#[derive(Debug, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl Default for ReqwestHttpSend {
    fn default() -> Self {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .expect("reqwest client with default settings must build");
        Self { client }
    }
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let uri = req.uri().to_string();
        let req = Request::try_from(req).map_err(|e| {
            Error::request_invalid("request cannot be converted for reqwest")
                .with_source(e)
                .with_context(format!("url: {uri}"))
        })?;

        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| classify(e, &uri))?
            .into();

        let (parts, body) = resp.into_parts();
        let declared = parts
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let bs = match BodyExt::collect(body).await {
            Ok(buf) => buf.to_bytes(),
            Err(e) => {
                debug!("reading body of {uri} failed: {e}");
                let err = match declared {
                    Some(n) => Error::truncated_response(format!(
                        "connection closed before {n} declared bytes arrived"
                    )),
                    None => Error::transport("reading response body failed"),
                };
                return Err(err.with_source(e).with_context(format!("url: {uri}")));
            }
        };

        Ok(http::Response::from_parts(parts, bs))
    }
}

fn classify(e: reqwest::Error, uri: &str) -> Error {
    let err = if e.is_timeout() {
        Error::timeout("request timed out in the http client")
    } else if e.is_builder() {
        Error::request_invalid("request rejected by the http client")
    } else {
        Error::transport("sending request failed")
    };
    err.with_source(e).with_context(format!("url: {uri}"))
}
