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

use super::entry::{Entry, QueueResponse, ResponseKind};
use super::QueueConfig;
use crate::utils::body_excerpt;
use crate::{Context, Error, Result};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use http::{HeaderMap, Method, StatusCode, Uri};
use log::{debug, warn};
use tokio::time::{sleep_until, Instant};
use xmltree::Element;

/// Headers carrying credentials that must not follow a redirect to another host.
const SENSITIVE_HEADERS: &[&str] = &["authorization", "authtoken"];

/// Bytes of an error body kept in the error message.
const ERROR_BODY_EXCERPT: usize = 512;

/// Drive one entry from start to its terminal state.
pub(crate) async fn run_entry(ctx: &Context, config: &QueueConfig, entry: &Entry) {
    let Some(req) = entry.begin() else {
        debug!("entry {} already finished, skipped", entry.id());
        return;
    };

    let result = tokio::select! {
        res = execute(ctx, req, entry.kind(), config.max_redirects) => res,
        _ = entry.cancelled() => Err(Error::cancelled("request cancelled while in flight")),
        _ = deadline_elapsed(entry.deadline()) => Err(Error::timeout("request deadline elapsed")),
    };

    let result = result.map_err(|e| e.with_context(format!("url: {}", entry.info().uri)));
    if let Err(err) = &result {
        warn!("entry {} failed: {err}", entry.id());
    }
    entry.settle(result);
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Send the request, following redirects, and decode the body as asked.
pub(crate) async fn execute(
    ctx: &Context,
    req: http::Request<Bytes>,
    kind: ResponseKind,
    max_redirects: usize,
) -> Result<QueueResponse> {
    let (parts, body) = req.into_parts();
    let mut method = parts.method;
    let mut uri = parts.uri;
    let mut headers = parts.headers;
    let mut body = body;
    let mut hops = 0;

    loop {
        let mut req = http::Request::builder()
            .method(method.clone())
            .uri(uri.clone())
            .body(body.clone())?;
        *req.headers_mut() = headers.clone();

        let resp = ctx.http_send(req).await?;
        let status = resp.status();

        if let Some(location) = redirect_location(status, resp.headers()) {
            hops += 1;
            if hops > max_redirects {
                return Err(Error::redirect_loop(format!(
                    "gave up after {max_redirects} redirects"
                ))
                .with_context(format!("last location: {location}")));
            }

            let next = resolve_location(&uri, &location)?;
            debug!("following {status} redirect #{hops} from {uri} to {next}");

            if status == StatusCode::SEE_OTHER
                || (method == Method::POST
                    && matches!(status, StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND))
            {
                method = Method::GET;
                body = Bytes::new();
                headers.remove(CONTENT_LENGTH);
                headers.remove(CONTENT_TYPE);
            }
            if next.authority() != uri.authority() {
                strip_sensitive(&mut headers);
            }
            uri = next;
            continue;
        }

        let (parts, body) = resp.into_parts();
        if method != Method::HEAD {
            check_content_length(&parts.headers, &body)?;
        }

        if !status.is_success() {
            return Err(Error::service(
                status,
                format!(
                    "{} {} failed: {}",
                    method,
                    uri.path(),
                    body_excerpt(&body, ERROR_BODY_EXCERPT)
                ),
            ));
        }

        return decode(kind, body);
    }
}

fn redirect_location(status: StatusCode, headers: &HeaderMap) -> Option<String> {
    if !matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    ) {
        return None;
    }

    headers
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn resolve_location(base: &Uri, location: &str) -> Result<Uri> {
    let target: Uri = location.parse()?;
    if target.scheme().is_some() {
        return Ok(target);
    }
    if !location.starts_with('/') {
        return Err(Error::request_invalid(format!(
            "unsupported relative redirect location: {location}"
        )));
    }

    let mut parts = http::uri::Parts::default();
    parts.scheme = base.scheme().cloned();
    parts.authority = base.authority().cloned();
    parts.path_and_query = target.path_and_query().cloned();
    Ok(Uri::from_parts(parts)?)
}

fn strip_sensitive(headers: &mut HeaderMap) {
    for name in SENSITIVE_HEADERS {
        headers.remove(*name);
    }
}

fn check_content_length(headers: &HeaderMap, body: &Bytes) -> Result<()> {
    let Some(declared) = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<usize>().ok())
    else {
        return Ok(());
    };

    if body.len() < declared {
        return Err(Error::truncated_response(format!(
            "connection closed after {} of {declared} bytes",
            body.len()
        )));
    }
    Ok(())
}

fn decode(kind: ResponseKind, body: Bytes) -> Result<QueueResponse> {
    match kind {
        ResponseKind::NoResponse => Ok(QueueResponse::Empty),
        ResponseKind::Data => Ok(QueueResponse::Data(body)),
        ResponseKind::Document => {
            let doc = Element::parse(body.as_ref()).map_err(|e| {
                Error::decoding_failed("response body is not a well formed XML document")
                    .with_source(anyhow::anyhow!(e.to_string()))
            })?;
            Ok(QueueResponse::Document(doc))
        }
    }
}
