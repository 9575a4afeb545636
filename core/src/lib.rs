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

//! Core components for talking to a storage service.
//!
//! This crate provides the foundational types and traits for the azstore ecosystem:
//! the pieces needed to sign a request and the queue that sends it.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for HTTP sending and environment access
//! - **Traits**: Abstract interfaces for credential loading (`ProvideCredential`) and request signing (`SignRequest`)
//! - **Signer**: Coordinates credential loading and request signing
//! - **RequestQueue**: Executes signed requests, in order or concurrently, and delivers exactly one result per request
//!
//! ## Example
//!
//! ```no_run
//! use azstore_core::{Context, QueueConfig, RequestQueue, Result};
//! use bytes::Bytes;
//!
//! # async fn example(ctx: Context) -> Result<()> {
//! let queue = RequestQueue::new(ctx, QueueConfig::concurrent());
//!
//! let req = http::Request::get("https://acct.blob.core.windows.net/logs/today.txt")
//!     .body(Bytes::new())?;
//! let body = queue.submit(req).data().await?;
//! println!("got {} bytes", body.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Traits
//!
//! - [`HttpSend`]: For sending HTTP requests
//! - [`Env`]: For environment variable access
//! - [`ProvideCredential`]: For loading credentials from various sources
//! - [`SignRequest`]: For building service-specific signatures
//! - [`SigningCredential`]: For validating credentials
//! - [`DecodeResponse`]: For turning queue responses into typed values
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time formatting and parsing
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};
mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod request;
pub use request::{SigningRequest, QUERY_ENCODE_SET};
mod signer;
pub use signer::Signer;

mod decode;
pub use decode::DecodeResponse;
pub mod queue;
pub use queue::{
    EntryHandle, EntryState, ExecutionMode, QueueConfig, QueueHandle, QueueResponse,
    RequestInfo, RequestQueue, ResponseKind, Submission,
};
