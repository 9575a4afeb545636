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

use crate::constants::*;
use crate::{Config, Credential, StorageRequest, StorageType};
use async_trait::async_trait;
use azstore_core::hash::{base64_decode, base64_hmac_sha256};
use azstore_core::time::{format_http_date, now, DateTime};
use azstore_core::{Context, Error, Result, SignRequest, SigningRequest};
use bytes::Bytes;
use http::header::{self, HeaderName};
use http::request::Parts;
use http::HeaderValue;
use log::debug;
use std::fmt::Write;
use std::time::Duration;

/// RequestSigner authenticates storage requests.
///
/// - Direct account credentials sign with Shared Key, using the blob/queue or table
///   canonical form depending on the [`StorageType`] of the request.
/// - Proxy sessions attach the session token as the `AuthToken` header.
///
/// Reference: [Authorize with Shared Key](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
#[derive(Debug, Clone)]
pub struct RequestSigner {
    time: Option<DateTime>,
    service_version: String,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSigner {
    /// Create a new signer using service version `2013-08-15`.
    pub fn new() -> Self {
        Self {
            time: None,
            service_version: DEFAULT_SERVICE_VERSION.to_string(),
        }
    }

    /// Create a new signer honoring the service version of `config`.
    pub fn from_config(config: &Config) -> Self {
        match &config.service_version {
            Some(v) => Self::new().with_service_version(v),
            None => Self::new(),
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Set the `x-ms-version` used when the request does not carry one.
    pub fn with_service_version(mut self, version: &str) -> Self {
        self.service_version = version.to_string();
        self
    }

    /// Build and sign a [`StorageRequest`] in one go.
    pub fn authenticated_request(
        &self,
        cred: &Credential,
        req: StorageRequest,
    ) -> Result<http::Request<Bytes>> {
        let (mut parts, body) = req.build(cred)?.into_parts();
        self.sign(&mut parts, cred)?;
        Ok(http::Request::from_parts(parts, body))
    }

    /// Sign the request in place.
    ///
    /// Every call signs again with a fresh timestamp, nothing is cached. On error
    /// the uri and headers of `parts` are left as they were.
    pub fn sign(&self, parts: &mut Parts, cred: &Credential) -> Result<()> {
        let uri = parts.uri.clone();
        let headers = parts.headers.clone();

        let result = self.sign_in_place(parts, cred);
        if result.is_err() {
            parts.uri = uri;
            parts.headers = headers;
        }
        result
    }

    fn sign_in_place(&self, parts: &mut Parts, cred: &Credential) -> Result<()> {
        let storage_type = parts
            .extensions
            .get::<StorageType>()
            .copied()
            .or_else(|| parts.uri.host().and_then(StorageType::from_host))
            .unwrap_or(StorageType::Blob);

        match cred {
            Credential::DirectAccount {
                account_name,
                account_key,
            } => {
                if account_name.is_empty() {
                    return Err(Error::config_invalid("account name is empty"));
                }
                // Decode first so that a bad key leaves the request untouched.
                let key = base64_decode(account_key)
                    .map_err(|e| e.with_context(format!("account: {account_name}")))?;

                let mut ctx = SigningRequest::build(parts)?;
                self.insert_common_headers(&mut ctx, storage_type)?;

                let string_to_sign = match storage_type {
                    StorageType::Table => table_string_to_sign(&ctx, account_name)?,
                    StorageType::Blob | StorageType::Queue => {
                        string_to_sign(&ctx, account_name)?
                    }
                };
                let signature = base64_hmac_sha256(&key, string_to_sign.as_bytes());

                let mut value: HeaderValue =
                    format!("SharedKey {account_name}:{signature}").parse()?;
                value.set_sensitive(true);
                ctx.headers.insert(header::AUTHORIZATION, value);

                ctx.apply(parts)
            }
            Credential::ProxySession { token, .. } => {
                if token.is_empty() {
                    return Err(Error::config_invalid("proxy session token is empty"));
                }

                let mut ctx = SigningRequest::build(parts)?;
                self.insert_common_headers(&mut ctx, storage_type)?;

                let mut value: HeaderValue = token.parse()?;
                value.set_sensitive(true);
                ctx.headers
                    .insert(HeaderName::from_static(AUTH_TOKEN), value);

                ctx.apply(parts)
            }
        }
    }

    fn insert_common_headers(
        &self,
        ctx: &mut SigningRequest,
        storage_type: StorageType,
    ) -> Result<()> {
        let now_time = self.time.unwrap_or_else(now);
        ctx.headers.insert(
            HeaderName::from_static(X_MS_DATE),
            format_http_date(now_time).parse()?,
        );

        let version = HeaderName::from_static(X_MS_VERSION);
        if !ctx.headers.contains_key(&version) {
            ctx.headers.insert(version, self.service_version.parse()?);
        }

        if storage_type == StorageType::Table {
            for (name, value) in [
                (DATA_SERVICE_VERSION, DATA_SERVICE_VERSION_VALUE),
                (MAX_DATA_SERVICE_VERSION, MAX_DATA_SERVICE_VERSION_VALUE),
            ] {
                let name = HeaderName::from_static(name);
                if !ctx.headers.contains_key(&name) {
                    ctx.headers.insert(name, HeaderValue::from_static(value));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::request_invalid("credential is required"));
        };
        if expires_in.is_some() {
            return Err(Error::request_invalid(
                "storage requests can only be signed with headers",
            ));
        }

        self.sign(req, cred)
    }
}

/// Construct string to sign for the blob and queue services.
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-Encoding + "\n" +
/// Content-Language + "\n" +
/// Content-Length + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// If-Modified-Since + "\n" +
/// If-Match + "\n" +
/// If-None-Match + "\n" +
/// If-Unmodified-Since + "\n" +
/// Range + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
fn string_to_sign(ctx: &SigningRequest, account_name: &str) -> Result<String> {
    let mut s = String::with_capacity(256);

    writeln!(&mut s, "{}", ctx.method.as_str())?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_ENCODING)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_LANGUAGE)?)?;
    writeln!(&mut s, "{}", {
        let content_length = ctx.header_get_or_default(&header::CONTENT_LENGTH)?;
        let version = ctx.header_get_or_default(&HeaderName::from_static(X_MS_VERSION))?;
        // Newer versions treat a zero length like an absent header.
        if content_length == "0" && version >= EMPTY_CONTENT_LENGTH_VERSION {
            ""
        } else {
            content_length
        }
    })?;
    writeln!(
        &mut s,
        "{}",
        ctx.header_get_or_default(&HeaderName::from_static(CONTENT_MD5))?
    )?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_TYPE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::DATE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_MODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_MATCH)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_NONE_MATCH)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_UNMODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::RANGE)?)?;
    writeln!(&mut s, "{}", canonicalize_header(ctx)?)?;
    write!(&mut s, "{}", canonicalize_resource(ctx, account_name))?;

    debug!("string to sign: {}", &s);

    Ok(s)
}

/// Construct string to sign for the table service.
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// CanonicalizedResource;
/// ```
///
/// Date is the `x-ms-date` value and the resource only keeps the `comp` parameter.
fn table_string_to_sign(ctx: &SigningRequest, account_name: &str) -> Result<String> {
    let mut s = String::with_capacity(128);

    writeln!(&mut s, "{}", ctx.method.as_str())?;
    writeln!(
        &mut s,
        "{}",
        ctx.header_get_or_default(&HeaderName::from_static(CONTENT_MD5))?
    )?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_TYPE)?)?;
    writeln!(
        &mut s,
        "{}",
        ctx.header_get_or_default(&HeaderName::from_static(X_MS_DATE))?
    )?;
    write!(&mut s, "/{}{}", account_name, ctx.path)?;
    if let Some(comp) = ctx.query_get("comp") {
        write!(&mut s, "?comp={comp}")?;
    }

    debug!("string to sign: {}", &s);

    Ok(s)
}

/// ## Reference
///
/// - [Constructing the canonicalized headers string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
fn canonicalize_header(ctx: &SigningRequest) -> Result<String> {
    Ok(SigningRequest::header_to_string(
        ctx.header_to_vec_with_prefix("x-ms-")?,
        ":",
        "\n",
    ))
}

/// ## Reference
///
/// - [Constructing the canonicalized resource string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)
fn canonicalize_resource(ctx: &SigningRequest, account_name: &str) -> String {
    if ctx.query.is_empty() {
        return format!("/{}{}", account_name, ctx.path);
    }

    format!(
        "/{}{}\n{}",
        account_name,
        ctx.path,
        ctx.query_to_canonical_string(":", "\n")
    )
}
