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

use async_trait::async_trait;
use azstore_core::{Context, ProvideCredential, Result};

use crate::credential::Credential;

/// StaticCredentialProvider always hands out the same credential.
#[derive(Clone, Debug)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Provide a credential built elsewhere, like a proxy session restored from disk.
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    /// Provide a direct account credential.
    pub fn new_account_key(account_name: &str, account_key: &str) -> Self {
        Self::new(Credential::with_account_key(account_name, account_key))
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _ctx: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_credential_provider_account_key() {
        let provider = StaticCredentialProvider::new_account_key("myaccount", "bXlrZXk=");
        let cred = provider.provide_credential(&Context::new()).await.unwrap();

        match cred {
            Some(Credential::DirectAccount {
                account_name,
                account_key,
            }) => {
                assert_eq!(account_name, "myaccount");
                assert_eq!(account_key, "bXlrZXk=");
            }
            _ => panic!("Expected DirectAccount credential"),
        }
    }

    #[tokio::test]
    async fn test_static_credential_provider_session() {
        let session = Credential::with_proxy_session(
            "https://proxy.example.com/login",
            "token",
            "https://proxy.example.com/tables",
            "https://proxy.example.com/blobs",
        );
        let provider = StaticCredentialProvider::new(session.clone());
        let cred = provider.provide_credential(&Context::new()).await.unwrap();

        assert_eq!(cred, Some(session));
    }
}
