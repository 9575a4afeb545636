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

use crate::StorageType;
use azstore_core::utils::Redact;
use azstore_core::{Error, Result, SigningCredential};
use http::Uri;
use std::fmt::{Debug, Formatter};

/// Credential used to reach a storage account.
///
/// Created once, either from an account key or from a proxy login, and never
/// mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Talk to the storage service directly, signing every request with the account key.
    DirectAccount {
        /// Storage account name.
        account_name: String,
        /// Base64 encoded account key.
        account_key: String,
    },
    /// Talk to a proxy service with a session token obtained at login.
    ProxySession {
        /// Url the login was made against.
        proxy_url: String,
        /// Session token attached to every request.
        token: String,
        /// Base url of the table service behind the proxy.
        table_service_url: String,
        /// Base url of the blob service behind the proxy.
        blob_service_url: String,
        /// Base url of the queue service behind the proxy, if any.
        queue_service_url: Option<String>,
    },
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::DirectAccount {
                account_name,
                account_key,
            } => f
                .debug_struct("Credential::DirectAccount")
                .field("account_name", account_name)
                .field("account_key", &Redact::from(account_key))
                .finish(),
            Credential::ProxySession {
                proxy_url,
                token,
                table_service_url,
                blob_service_url,
                queue_service_url,
            } => f
                .debug_struct("Credential::ProxySession")
                .field("proxy_url", proxy_url)
                .field("token", &Redact::from(token))
                .field("table_service_url", table_service_url)
                .field("blob_service_url", blob_service_url)
                .field("queue_service_url", queue_service_url)
                .finish(),
        }
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        match self {
            Credential::DirectAccount {
                account_name,
                account_key,
            } => !account_name.is_empty() && !account_key.is_empty(),
            Credential::ProxySession { token, .. } => !token.is_empty(),
        }
    }
}

impl Credential {
    /// Create a credential for direct access with an account key.
    pub fn with_account_key(account_name: &str, account_key: &str) -> Self {
        Self::DirectAccount {
            account_name: account_name.to_string(),
            account_key: account_key.to_string(),
        }
    }

    /// Create a credential for an already established proxy session.
    pub fn with_proxy_session(
        proxy_url: &str,
        token: &str,
        table_service_url: &str,
        blob_service_url: &str,
    ) -> Self {
        Self::ProxySession {
            proxy_url: proxy_url.to_string(),
            token: token.to_string(),
            table_service_url: table_service_url.to_string(),
            blob_service_url: blob_service_url.to_string(),
            queue_service_url: None,
        }
    }

    /// Set the queue service url of a proxy session, no-op for direct credentials.
    pub fn with_queue_service_url(mut self, url: &str) -> Self {
        if let Credential::ProxySession {
            queue_service_url, ..
        } = &mut self
        {
            *queue_service_url = Some(url.to_string());
        }
        self
    }

    /// Whether requests go through the proxy service.
    pub fn uses_proxy(&self) -> bool {
        matches!(self, Credential::ProxySession { .. })
    }

    /// Account name for direct credentials.
    pub fn account_name(&self) -> Option<&str> {
        match self {
            Credential::DirectAccount { account_name, .. } => Some(account_name),
            Credential::ProxySession { .. } => None,
        }
    }

    /// Session token for proxy credentials.
    pub fn token(&self) -> Option<&str> {
        match self {
            Credential::ProxySession { token, .. } => Some(token),
            Credential::DirectAccount { .. } => None,
        }
    }

    /// Base url of the given service, without trailing slash.
    pub fn service_url(&self, storage_type: StorageType) -> Result<String> {
        match self {
            Credential::DirectAccount { account_name, .. } => {
                if account_name.is_empty() {
                    return Err(Error::config_invalid("account name is empty"));
                }
                Ok(format!(
                    "https://{account_name}.{storage_type}.{}",
                    crate::constants::ENDPOINT_SUFFIX
                ))
            }
            Credential::ProxySession {
                table_service_url,
                blob_service_url,
                queue_service_url,
                ..
            } => {
                let url = match storage_type {
                    StorageType::Table => Some(table_service_url.as_str()),
                    StorageType::Blob => Some(blob_service_url.as_str()),
                    StorageType::Queue => queue_service_url.as_deref(),
                }
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    Error::config_invalid(format!(
                        "proxy session has no {storage_type} service url"
                    ))
                })?;
                Ok(url.trim_end_matches('/').to_string())
            }
        }
    }

    /// Resolve an endpoint like `mycontainer?restype=container` into a full url.
    pub fn url_for_endpoint(&self, endpoint: &str, storage_type: StorageType) -> Result<Uri> {
        let base = self.service_url(storage_type)?;
        let url = format!("{base}/{}", endpoint.trim_start_matches('/'));
        url.parse::<Uri>()
            .map_err(|e| Error::from(e).with_context(format!("url: {url}")))
    }
}
