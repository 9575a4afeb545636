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

//! Blob, queue and table storage with convenience APIs.

pub use azstore_storage::*;

#[cfg(feature = "default-context")]
use crate::{default_context, QueueConfig, RequestQueue, Result, Signer};

/// Signer for storage requests with a cached credential.
#[cfg(feature = "default-context")]
pub type DefaultSigner = Signer<Credential>;

/// Create a storage signer with standard configuration.
///
/// - Default context (reqwest HTTP client, OS environment)
/// - Credential from the environment: account key, or a proxy login
/// - Service version from `AZSTORE_SERVICE_VERSION` when set
///
/// # Customization
///
/// ```no_run
/// use azstore::storage::{default_signer, StaticCredentialProvider};
///
/// let signer = default_signer().with_credential_provider(
///     StaticCredentialProvider::new_account_key("myaccount", "bXlrZXk="),
/// );
/// ```
#[cfg(feature = "default-context")]
pub fn default_signer() -> DefaultSigner {
    let ctx = default_context();
    let config = Config::default().from_env(&ctx);
    let signer = RequestSigner::from_config(&config);
    Signer::new(ctx, ConfigCredentialProvider::new(config), signer)
}

/// Create a request queue configured from the environment.
///
/// # Panics
///
/// Panics if called outside of a tokio runtime.
#[cfg(feature = "default-context")]
pub fn default_queue() -> Result<RequestQueue> {
    let ctx = default_context();
    let config = QueueConfig::default().from_env(&ctx)?;
    Ok(RequestQueue::new(ctx, config))
}
