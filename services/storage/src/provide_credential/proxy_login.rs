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

use crate::{Config, Credential};
use async_trait::async_trait;
use azstore_core::utils::{body_excerpt, Redact};
use azstore_core::{Context, Error, ProvideCredential, Result};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use log::{debug, warn};
use quick_xml::{de, se};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// AuthenticationDelegate is told how a proxy login ended.
pub trait AuthenticationDelegate: Send + Sync + 'static {
    /// The login succeeded with this session.
    fn login_did_succeed(&self, credential: &Credential);

    /// The login failed, no credential was created.
    fn login_did_fail(&self, error: &Error);
}

/// ProxyLoginCredentialProvider logs in to a proxy service to obtain a session token.
///
/// The handshake is one `POST` of
/// `<Login><UserName>…</UserName><Password>…</Password></Login>` to the proxy url,
/// answered by
/// `<LoginResponse><Token>…</Token><TableServiceUrl>…</TableServiceUrl>…</LoginResponse>`.
///
/// Service urls set on the provider take precedence over the ones in the response.
/// The same handshake is exposed as [`login`](Self::login),
/// [`login_blocking`](Self::login_blocking),
/// [`login_with_callback`](Self::login_with_callback) and
/// [`login_with_delegate`](Self::login_with_delegate).
#[derive(Clone)]
pub struct ProxyLoginCredentialProvider {
    proxy_url: String,
    username: String,
    password: String,
    table_service_url: Option<String>,
    blob_service_url: Option<String>,
    queue_service_url: Option<String>,
}

impl Debug for ProxyLoginCredentialProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyLoginCredentialProvider")
            .field("proxy_url", &self.proxy_url)
            .field("username", &self.username)
            .field("password", &Redact::from(&self.password))
            .field("table_service_url", &self.table_service_url)
            .field("blob_service_url", &self.blob_service_url)
            .field("queue_service_url", &self.queue_service_url)
            .finish()
    }
}

impl ProxyLoginCredentialProvider {
    /// Create a new provider for the given proxy and user.
    pub fn new(proxy_url: &str, username: &str, password: &str) -> Self {
        Self {
            proxy_url: proxy_url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            table_service_url: None,
            blob_service_url: None,
            queue_service_url: None,
        }
    }

    /// Create a provider from the proxy fields of a config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let (Some(proxy_url), Some(username)) = (&config.proxy_url, &config.proxy_username)
        else {
            return Err(Error::config_invalid(
                "proxy url and user name are required for proxy login",
            ));
        };

        Ok(Self {
            proxy_url: proxy_url.clone(),
            username: username.clone(),
            password: config.proxy_password.clone().unwrap_or_default(),
            table_service_url: config.table_service_url.clone(),
            blob_service_url: config.blob_service_url.clone(),
            queue_service_url: config.queue_service_url.clone(),
        })
    }

    /// Use this table service url instead of the one returned by the proxy.
    pub fn with_table_service_url(mut self, url: &str) -> Self {
        self.table_service_url = Some(url.to_string());
        self
    }

    /// Use this blob service url instead of the one returned by the proxy.
    pub fn with_blob_service_url(mut self, url: &str) -> Self {
        self.blob_service_url = Some(url.to_string());
        self
    }

    /// Use this queue service url instead of the one returned by the proxy.
    pub fn with_queue_service_url(mut self, url: &str) -> Self {
        self.queue_service_url = Some(url.to_string());
        self
    }

    /// Log in and return the session.
    ///
    /// Nothing is returned unless every field of the session is known.
    pub async fn login(&self, ctx: &Context) -> Result<Credential> {
        if self.proxy_url.is_empty() || self.username.is_empty() {
            return Err(Error::config_invalid(
                "proxy url and user name are required for proxy login",
            ));
        }

        let body = se::to_string(&LoginRequest {
            user_name: &self.username,
            password: &self.password,
        })
        .map_err(|e| Error::unexpected("failed to serialize login request").with_source(e))?;

        let req = http::Request::post(&self.proxy_url)
            .header(CONTENT_TYPE, "application/xml")
            .body(Bytes::from(body))?;

        debug!("logging in to proxy {} as {}", self.proxy_url, self.username);
        let resp = ctx
            .http_send(req)
            .await
            .map_err(|e| e.with_context(format!("proxy: {}", self.proxy_url)))?;

        let status = resp.status();
        let body = resp.into_body();
        if !status.is_success() {
            return Err(Error::authentication_failed(format!(
                "proxy rejected login: {}",
                body_excerpt(&body, 512)
            ))
            .with_status(status)
            .with_context(format!("proxy: {}", self.proxy_url)));
        }

        let body = String::from_utf8(body.to_vec()).map_err(|e| {
            Error::authentication_failed("proxy login response is not valid utf-8")
                .with_source(e)
                .with_context(format!("proxy: {}", self.proxy_url))
        })?;
        let resp: LoginResponse = de::from_str(&body).map_err(|e| {
            Error::authentication_failed("proxy login response is not a valid document")
                .with_source(e)
                .with_context(format!("proxy: {}", self.proxy_url))
        })?;
        if resp.token.is_empty() {
            return Err(Error::authentication_failed(
                "proxy login response carries no token",
            )
            .with_context(format!("proxy: {}", self.proxy_url)));
        }

        let pick = |explicit: &Option<String>, returned: Option<String>| {
            explicit
                .clone()
                .or(returned)
                .filter(|v| !v.is_empty())
        };
        let table_service_url = pick(&self.table_service_url, resp.table_service_url)
            .ok_or_else(|| {
                Error::config_invalid("table service url is neither configured nor returned by proxy")
            })?;
        let blob_service_url = pick(&self.blob_service_url, resp.blob_service_url)
            .ok_or_else(|| {
                Error::config_invalid("blob service url is neither configured nor returned by proxy")
            })?;
        let queue_service_url = pick(&self.queue_service_url, resp.queue_service_url);

        debug!("proxy login as {} succeeded", self.username);
        Ok(Credential::ProxySession {
            proxy_url: self.proxy_url.clone(),
            token: resp.token,
            table_service_url,
            blob_service_url,
            queue_service_url,
        })
    }

    /// Log in, blocking the current thread until the handshake finished.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn login_blocking(&self, ctx: &Context) -> Result<Credential> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(self.login(ctx))
    }

    /// Log in on the current runtime and hand the result to `callback`.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn login_with_callback<F>(&self, ctx: &Context, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Credential>) + Send + 'static,
    {
        let this = self.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move { callback(this.login(&ctx).await) })
    }

    /// Log in on the current runtime and report the outcome to `delegate`.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn login_with_delegate(
        &self,
        ctx: &Context,
        delegate: Arc<dyn AuthenticationDelegate>,
    ) -> JoinHandle<()> {
        self.login_with_callback(ctx, move |res| match res {
            Ok(cred) => delegate.login_did_succeed(&cred),
            Err(err) => {
                warn!("proxy login failed: {err}");
                delegate.login_did_fail(&err)
            }
        })
    }
}

#[async_trait]
impl ProvideCredential for ProxyLoginCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.login(ctx).await?))
    }
}

#[derive(Serialize)]
#[serde(rename = "Login", rename_all = "PascalCase")]
struct LoginRequest<'a> {
    user_name: &'a str,
    password: &'a str,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct LoginResponse {
    token: String,
    table_service_url: Option<String>,
    blob_service_url: Option<String>,
    queue_service_url: Option<String>,
}
