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

mod concurrent;
mod ordered;
mod response;

use async_trait::async_trait;
use azstore_core::{Context, HttpSend, RequestQueue, QueueConfig, Result};
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode, Uri};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the stub answers for one request.
pub struct Reply {
    status: StatusCode,
    headers: Vec<(&'static str, String)>,
    body: Bytes,
    delay: Duration,
}

impl Reply {
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::status(StatusCode::OK).with_body(body)
    }

    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn redirect(status: StatusCode, location: &str) -> Self {
        Self::status(status).with_header("location", location)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A request as the stub received it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

type Responder = dyn Fn(&http::Request<Bytes>) -> Reply + Send + Sync;

/// HttpSend answering from a closure and recording concurrency.
#[derive(Clone)]
pub struct StubHttpSend {
    responder: Arc<Responder>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Debug for StubHttpSend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubHttpSend")
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl StubHttpSend {
    pub fn new(responder: impl Fn(&http::Request<Bytes>) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            responder: Arc::new(responder),
            in_flight: Arc::default(),
            max_in_flight: Arc::default(),
            seen: Arc::default(),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn seen_paths(&self) -> Vec<String> {
        self.seen().iter().map(|s| s.uri.path().to_string()).collect()
    }
}

struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpSend for StubHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.seen.lock().unwrap().push(Seen {
            method: req.method().clone(),
            uri: req.uri().clone(),
            headers: req.headers().clone(),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(self.in_flight.clone());

        let reply = (self.responder)(&req);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }

        let mut builder = http::Response::builder().status(reply.status);
        for (name, value) in reply.headers {
            builder = builder.header(name, value);
        }
        Ok(builder.body(reply.body)?)
    }
}

pub fn init_queue(stub: &StubHttpSend, config: QueueConfig) -> RequestQueue {
    let _ = env_logger::builder().is_test(true).try_init();

    let ctx = Context::new().with_http_send(stub.clone());
    RequestQueue::new(ctx, config)
}

pub fn request(path: &str) -> http::Request<Bytes> {
    http::Request::get(format!("https://acct.blob.core.windows.net{path}"))
        .header("x-ms-version", "2013-08-15")
        .body(Bytes::new())
        .unwrap()
}

/// Delay encoded in the request path as `/slow/{ms}/...`.
pub fn path_delay(req: &http::Request<Bytes>) -> Duration {
    let mut segs = req.uri().path().trim_start_matches('/').split('/');
    match (segs.next(), segs.next()) {
        (Some("slow"), Some(ms)) => Duration::from_millis(ms.parse().unwrap()),
        _ => Duration::ZERO,
    }
}
