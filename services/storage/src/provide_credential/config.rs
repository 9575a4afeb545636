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

use crate::provide_credential::ProxyLoginCredentialProvider;
use crate::{Config, Credential};
use async_trait::async_trait;
use azstore_core::{Context, ProvideCredential, Result};
use log::debug;
use std::sync::Arc;

/// ConfigCredentialProvider turns a [`Config`] into a credential.
///
/// - account name and key set: a direct account credential.
/// - otherwise proxy url and user name set: a proxy login.
/// - otherwise nothing.
#[derive(Debug, Clone)]
pub struct ConfigCredentialProvider {
    config: Arc<Config>,
}

impl ConfigCredentialProvider {
    /// Create a new provider from config.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let config = &self.config;

        if config.has_account_key() {
            if let (Some(name), Some(key)) = (&config.account_name, &config.account_key) {
                return Ok(Some(Credential::with_account_key(name, key)));
            }
        }

        if config.has_proxy_login() {
            debug!("no account key configured, logging in to proxy");
            let provider = ProxyLoginCredentialProvider::from_config(config)?;
            return Ok(Some(provider.login(ctx).await?));
        }

        Ok(None)
    }
}
