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

//! Request queue delivering one typed completion per submitted request.
//!
//! Two execution modes are available, chosen once per queue:
//!
//! - [`ExecutionMode::Concurrent`]: every entry is dispatched right away.
//! - [`ExecutionMode::Ordered`]: entries run one at a time in submission order, entry
//!   `n + 1` starts only after entry `n`'s completion handler returned.
//!
//! Transport failures are reported once and never retried here.

mod entry;
pub use entry::{EntryHandle, EntryState, QueueHandle, QueueResponse, RequestInfo, ResponseKind};

mod execute;
mod ordered;

use crate::{Context, DecodeResponse, Error, Result};
use bytes::Bytes;
use entry::{Completion, Entry};
use execute::run_entry;
use log::debug;
use ordered::Lane;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::Instant;
use xmltree::Element;

/// Env to pick the execution mode, `ordered` or `concurrent`.
pub const AZSTORE_QUEUE_MODE: &str = "AZSTORE_QUEUE_MODE";
/// Env to override the redirect hop limit.
pub const AZSTORE_QUEUE_MAX_REDIRECTS: &str = "AZSTORE_QUEUE_MAX_REDIRECTS";
/// Env to set a default per entry deadline in milliseconds.
pub const AZSTORE_QUEUE_DEADLINE_MS: &str = "AZSTORE_QUEUE_DEADLINE_MS";

/// Scheduling discipline of a [`RequestQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Dispatch immediately, no ordering between entries.
    #[default]
    Concurrent,
    /// One entry in flight at a time, in submission order.
    Ordered,
}

impl FromStr for ExecutionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concurrent" => Ok(ExecutionMode::Concurrent),
            "ordered" => Ok(ExecutionMode::Ordered),
            v => Err(Error::config_invalid(format!(
                "unknown queue mode {v}, expected ordered or concurrent"
            ))),
        }
    }
}

/// Config for [`RequestQueue`].
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Execution mode for the whole queue.
    pub mode: ExecutionMode,
    /// Redirect hops followed before failing with `RedirectLoop`.
    pub max_redirects: usize,
    /// Deadline applied to entries submitted without one.
    pub default_deadline: Option<Duration>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Concurrent,
            max_redirects: 10,
            default_deadline: None,
        }
    }
}

impl QueueConfig {
    /// Config for an ordered queue.
    pub fn ordered() -> Self {
        Self {
            mode: ExecutionMode::Ordered,
            ..Default::default()
        }
    }

    /// Config for a concurrent queue.
    pub fn concurrent() -> Self {
        Self::default()
    }

    /// Set the redirect hop limit.
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Set the default per entry deadline.
    pub fn with_default_deadline(mut self, deadline: Duration) -> Self {
        self.default_deadline = Some(deadline);
        self
    }

    /// Override values from env.
    pub fn from_env(mut self, ctx: &Context) -> Result<Self> {
        if let Some(v) = ctx.env_var(AZSTORE_QUEUE_MODE) {
            self.mode = v.parse()?;
        }
        if let Some(v) = ctx.env_var(AZSTORE_QUEUE_MAX_REDIRECTS) {
            self.max_redirects = v.trim().parse().map_err(|e| {
                Error::config_invalid(format!("invalid {AZSTORE_QUEUE_MAX_REDIRECTS}: {v}"))
                    .with_source(anyhow::Error::new(e))
            })?;
        }
        if let Some(v) = ctx.env_var(AZSTORE_QUEUE_DEADLINE_MS) {
            let ms: u64 = v.trim().parse().map_err(|e| {
                Error::config_invalid(format!("invalid {AZSTORE_QUEUE_DEADLINE_MS}: {v}"))
                    .with_source(anyhow::Error::new(e))
            })?;
            self.default_deadline = Some(Duration::from_millis(ms));
        }
        Ok(self)
    }
}

pub(crate) struct Inner {
    ctx: Context,
    config: QueueConfig,
    runtime: Handle,
    next_id: AtomicU64,
    active: Mutex<HashMap<u64, Arc<Entry>>>,
    lane: Mutex<Lane>,
}

impl Inner {
    fn spawn_concurrent(self: &Arc<Self>, entry: Arc<Entry>) {
        self.active
            .lock()
            .expect("lock poisoned")
            .insert(entry.id(), entry.clone());

        let inner = self.clone();
        self.runtime.spawn(async move {
            run_entry(&inner.ctx, &inner.config, &entry).await;
            inner
                .active
                .lock()
                .expect("lock poisoned")
                .remove(&entry.id());
        });
    }
}

/// RequestQueue executes signed requests and delivers exactly one completion for
/// each of them.
///
/// ## Example
///
/// ```no_run
/// use azstore_core::{Context, QueueConfig, RequestQueue};
/// use bytes::Bytes;
/// use std::time::Duration;
///
/// # async fn example(ctx: Context, req: http::Request<Bytes>) -> azstore_core::Result<()> {
/// let queue = RequestQueue::new(ctx, QueueConfig::ordered());
/// let doc = queue
///     .submit(req)
///     .with_deadline(Duration::from_secs(30))
///     .document()
///     .await?;
/// println!("root element: {}", doc.name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RequestQueue {
    inner: Arc<Inner>,
}

impl Debug for RequestQueue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestQueue")
            .field("ctx", &self.inner.ctx)
            .field("config", &self.inner.config)
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

impl RequestQueue {
    /// Create a queue that spawns its work on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime, use [`RequestQueue::with_runtime`]
    /// in that case.
    pub fn new(ctx: Context, config: QueueConfig) -> Self {
        Self::with_runtime(ctx, config, Handle::current())
    }

    /// Create a queue that spawns its work on the given runtime.
    pub fn with_runtime(ctx: Context, config: QueueConfig, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                config,
                runtime,
                next_id: AtomicU64::new(0),
                active: Mutex::new(HashMap::new()),
                lane: Mutex::new(Lane::default()),
            }),
        }
    }

    /// Get the execution mode of this queue.
    pub fn mode(&self) -> ExecutionMode {
        self.inner.config.mode
    }

    /// Start a submission for the request.
    ///
    /// Nothing is queued until one of the completion methods of [`Submission`] is
    /// called. Those never block.
    pub fn submit(&self, request: http::Request<Bytes>) -> Submission<'_> {
        Submission {
            queue: self,
            request,
            deadline: None,
        }
    }

    /// Number of entries submitted and not finished yet.
    pub fn outstanding(&self) -> usize {
        match self.inner.config.mode {
            ExecutionMode::Concurrent => self.inner.active.lock().expect("lock poisoned").len(),
            ExecutionMode::Ordered => self.inner.lane.lock().expect("lock poisoned").outstanding(),
        }
    }

    /// Number of entries doing network I/O right now.
    ///
    /// Never more than one for an ordered queue.
    pub fn in_flight(&self) -> usize {
        self.unfinished()
            .iter()
            .filter(|e| e.state() == EntryState::InFlight)
            .count()
    }

    /// Cancel every unfinished entry, returns how many were asked to cancel.
    pub fn cancel_all(&self) -> usize {
        self.unfinished().iter().filter(|e| e.cancel()).count()
    }

    fn unfinished(&self) -> Vec<Arc<Entry>> {
        match self.inner.config.mode {
            ExecutionMode::Concurrent => self
                .inner
                .active
                .lock()
                .expect("lock poisoned")
                .values()
                .cloned()
                .collect(),
            ExecutionMode::Ordered => self
                .inner
                .lane
                .lock()
                .expect("lock poisoned")
                .unfinished()
                .cloned()
                .collect(),
        }
    }

    fn enqueue(
        &self,
        request: http::Request<Bytes>,
        kind: ResponseKind,
        deadline: Option<Duration>,
        completion: Completion,
    ) -> EntryHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let deadline = deadline
            .or(self.inner.config.default_deadline)
            .map(|d| Instant::now() + d);
        let entry = Entry::new(id, request, kind, deadline, completion);
        debug!("submitted entry {id} as {kind:?}");

        match self.inner.config.mode {
            ExecutionMode::Concurrent => self.inner.spawn_concurrent(entry.clone()),
            ExecutionMode::Ordered => ordered::push(&self.inner, entry.clone()),
        }
        EntryHandle::new(entry)
    }
}

/// Builder returned by [`RequestQueue::submit`], picks the completion kind.
#[must_use = "nothing is queued until a completion kind is chosen"]
pub struct Submission<'a> {
    queue: &'a RequestQueue,
    request: http::Request<Bytes>,
    deadline: Option<Duration>,
}

impl Submission<'_> {
    /// Fail the entry with `Timeout` if it has not finished within `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Only report success or failure.
    pub fn no_response(self) -> QueueHandle<()> {
        self.map(ResponseKind::NoResponse, |_| Ok(()))
    }

    /// Parse the body as an XML document.
    pub fn document(self) -> QueueHandle<Element> {
        self.map(ResponseKind::Document, QueueResponse::into_document)
    }

    /// Deliver the body as raw bytes.
    pub fn data(self) -> QueueHandle<Bytes> {
        self.map(ResponseKind::Data, QueueResponse::into_data)
    }

    /// Deliver the untyped response of the given kind.
    pub fn response(self, kind: ResponseKind) -> QueueHandle<QueueResponse> {
        self.map(kind, Ok)
    }

    /// Hand the response to a decoder and deliver its output.
    pub fn decoded<D: DecodeResponse>(self, decoder: D) -> QueueHandle<D::Output> {
        let info = RequestInfo {
            method: self.request.method().clone(),
            uri: self.request.uri().clone(),
        };
        self.map(decoder.kind(), move |resp| decoder.decode(&info, resp))
    }

    /// Invoke `callback` with the result instead of returning a future.
    pub fn with_callback<F>(self, kind: ResponseKind, callback: F) -> EntryHandle
    where
        F: FnOnce(Result<QueueResponse>) + Send + 'static,
    {
        self.queue
            .enqueue(self.request, kind, self.deadline, Box::new(callback))
    }

    fn map<T, F>(self, kind: ResponseKind, f: F) -> QueueHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(QueueResponse) -> Result<T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let entry = self.queue.enqueue(
            self.request,
            kind,
            self.deadline,
            Box::new(move |res| {
                // The receiver may be gone, the caller no longer cares then.
                let _ = tx.send(res.and_then(f));
            }),
        );
        QueueHandle::new(entry, rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticEnv;

    #[test]
    fn test_execution_mode_from_str() {
        assert_eq!("Ordered".parse::<ExecutionMode>().unwrap(), ExecutionMode::Ordered);
        assert_eq!(" concurrent ".parse::<ExecutionMode>().unwrap(), ExecutionMode::Concurrent);
        assert!("fifo".parse::<ExecutionMode>().is_err());
    }

    #[test]
    fn test_config_from_env() {
        let ctx = Context::new().with_env(StaticEnv {
            envs: HashMap::from([
                (AZSTORE_QUEUE_MODE.to_string(), "ordered".to_string()),
                (AZSTORE_QUEUE_MAX_REDIRECTS.to_string(), "3".to_string()),
                (AZSTORE_QUEUE_DEADLINE_MS.to_string(), "1500".to_string()),
            ]),
        });

        let config = QueueConfig::default().from_env(&ctx).unwrap();
        assert_eq!(config.mode, ExecutionMode::Ordered);
        assert_eq!(config.max_redirects, 3);
        assert_eq!(config.default_deadline, Some(Duration::from_millis(1500)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_entries_are_released() {
        let queue = RequestQueue::new(
            Context::new(),
            QueueConfig::ordered().with_default_deadline(Duration::from_secs(600)),
        );
        let req = http::Request::get("https://acct.blob.core.windows.net/c")
            .body(Bytes::new())
            .unwrap();

        let handle = queue.submit(req).no_response();
        let entry = handle.entry().shared().clone();
        assert_eq!(
            handle.await.unwrap_err().kind(),
            crate::ErrorKind::Transport
        );
        tokio::time::sleep(Duration::from_millis(1)).await;

        // Neither the lane nor the deadline watchdog holds on to the entry.
        assert_eq!(queue.outstanding(), 0);
        assert_eq!(Arc::strong_count(&entry), 1);
    }

    #[test]
    fn test_config_from_env_invalid() {
        let ctx = Context::new().with_env(StaticEnv {
            envs: HashMap::from([(AZSTORE_QUEUE_DEADLINE_MS.to_string(), "soon".to_string())]),
        });

        let err = QueueConfig::default().from_env(&ctx).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ConfigInvalid);
    }
}
