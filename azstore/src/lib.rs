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

//! Authenticated requests for cloud blob, queue and table storage.
//!
//! This crate bundles [`azstore_core`] and [`azstore_storage`], and with the
//! `default-context` feature also a [`Context`] backed by reqwest.
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> azstore::Result<()> {
//! use azstore::storage::{StorageRequest, StorageType};
//!
//! let signer = azstore::storage::default_signer();
//! let queue = azstore::storage::default_queue()?;
//!
//! let cred = signer.credential().await?;
//! let req = azstore::storage::RequestSigner::new().authenticated_request(
//!     &cred,
//!     StorageRequest::new("?comp=list", StorageType::Queue),
//! )?;
//! let doc = queue.submit(req).document().await?;
//! println!("{}", doc.name);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub use azstore_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::default_context;

pub mod storage;
