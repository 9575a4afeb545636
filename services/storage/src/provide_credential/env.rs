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

use crate::provide_credential::ConfigCredentialProvider;
use crate::{Config, Credential};
use async_trait::async_trait;
use azstore_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads the credential from environment variables.
///
/// See [`Config::from_env`] for the variables looked at.
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new env provider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let config = Config::default().from_env(ctx);
        ConfigCredentialProvider::new(config)
            .provide_credential(ctx)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azstore_core::StaticEnv;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_env_credential_provider_account_key() {
        let envs = HashMap::from([
            ("AZBLOB_ACCOUNT_NAME".to_string(), "myaccount".to_string()),
            ("AZBLOB_ACCOUNT_KEY".to_string(), "bXlrZXk=".to_string()),
        ]);
        let ctx = Context::new().with_env(StaticEnv { envs });

        let cred = EnvCredentialProvider::new()
            .provide_credential(&ctx)
            .await
            .unwrap();
        assert_eq!(
            cred,
            Some(Credential::with_account_key("myaccount", "bXlrZXk="))
        );
    }

    #[tokio::test]
    async fn test_env_credential_provider_none() {
        let cred = EnvCredentialProvider::new()
            .provide_credential(&Context::new())
            .await
            .unwrap();

        assert!(cred.is_none());
    }
}
