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

//! Authenticated requests for the blob, queue and table storage services.
//!
//! This crate provides:
//!
//! - [`Credential`]: direct account access or a proxy session.
//! - [`RequestSigner`]: Shared Key signing for direct access, `AuthToken` for proxy sessions.
//! - [`StorageRequest`]: describe an operation before it is signed.
//! - [`ProxyLoginCredentialProvider`]: obtain a proxy session, async, blocking, via callback or delegate.
//! - [`predicate`]: translate structured predicates into table `$filter` expressions.
//!
//! # Example
//!
//! ```rust,no_run
//! use anyhow::Result;
//! use azstore_core::{Context, OsEnv, QueueConfig, RequestQueue, Signer};
//! use azstore_http_send_reqwest::ReqwestHttpSend;
//! use azstore_storage::{EnvCredentialProvider, RequestSigner, StorageRequest, StorageType};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     // Load the credential once and sign many requests with it.
//!     let signer = Signer::new(ctx.clone(), EnvCredentialProvider::new(), RequestSigner::new());
//!
//!     let req = StorageRequest::new("images?restype=container&comp=list", StorageType::Blob);
//!     let cred = signer.credential().await?;
//!     let req = RequestSigner::new().authenticated_request(&cred, req)?;
//!
//!     let queue = RequestQueue::new(ctx, QueueConfig::default());
//!     let doc = queue.submit(req).document().await?;
//!     println!("root element: {}", doc.name);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod constants;

mod storage_type;
pub use storage_type::StorageType;

mod credential;
pub use credential::Credential;

mod config;
pub use config::Config;

mod request;
pub use request::StorageRequest;

mod sign_request;
pub use sign_request::RequestSigner;

mod provide_credential;
pub use provide_credential::*;

pub mod predicate;
