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

use crate::{Error, ErrorKind, Result};
use bytes::Bytes;
use http::{Method, Uri};
use log::{debug, warn};
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::Poll;
use tokio::sync::{oneshot, Notify};
use tokio::time::Instant;
use xmltree::Element;

/// Lifecycle of a submitted request.
///
/// ```text
/// Pending -> (ordered: Waiting ->) InFlight -> Completed | Failed | Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Accepted but not looked at by the dispatcher yet.
    Pending,
    /// Queued behind earlier entries in ordered mode.
    Waiting,
    /// Network I/O is running.
    InFlight,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Cancelled by its owner.
    Cancelled,
}

impl EntryState {
    /// Whether the completion handler has already fired.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EntryState::Completed | EntryState::Failed | EntryState::Cancelled
        )
    }

    fn not_started(&self) -> bool {
        matches!(self, EntryState::Pending | EntryState::Waiting)
    }
}

/// How the response body is handed to the completion handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Only success or failure matters, the body is dropped.
    NoResponse,
    /// The body is parsed as an XML document.
    Document,
    /// The body is delivered as raw bytes.
    Data,
}

/// Result delivered to a completion handler.
#[derive(Debug, Clone)]
pub enum QueueResponse {
    /// Delivered for [`ResponseKind::NoResponse`].
    Empty,
    /// Delivered for [`ResponseKind::Document`].
    Document(Element),
    /// Delivered for [`ResponseKind::Data`].
    Data(Bytes),
}

impl QueueResponse {
    /// Take the parsed document out.
    pub fn into_document(self) -> Result<Element> {
        match self {
            QueueResponse::Document(doc) => Ok(doc),
            other => Err(Error::decoding_failed(format!(
                "expected document response, got {}",
                other.name()
            ))),
        }
    }

    /// Take the raw body out.
    pub fn into_data(self) -> Result<Bytes> {
        match self {
            QueueResponse::Data(bs) => Ok(bs),
            other => Err(Error::decoding_failed(format!(
                "expected data response, got {}",
                other.name()
            ))),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            QueueResponse::Empty => "empty",
            QueueResponse::Document(_) => "document",
            QueueResponse::Data(_) => "data",
        }
    }
}

/// The originating request of a response, handed to decoders.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    /// HTTP method of the submitted request.
    pub method: Method,
    /// Url of the submitted request, before any redirect.
    pub uri: Uri,
}

pub(crate) type Completion = Box<dyn FnOnce(Result<QueueResponse>) + Send + 'static>;

/// One submitted request, owned by the queue until its completion fires.
pub(crate) struct Entry {
    id: u64,
    kind: ResponseKind,
    info: RequestInfo,
    deadline: Option<Instant>,
    request: Mutex<Option<http::Request<Bytes>>>,
    state: Mutex<EntryState>,
    completion: Mutex<Option<Completion>>,
    cancel: Notify,
    started: Notify,
}

impl Debug for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("method", &self.info.method)
            .field("uri", &self.info.uri)
            .field("state", &self.state())
            .finish()
    }
}

impl Entry {
    pub(crate) fn new(
        id: u64,
        request: http::Request<Bytes>,
        kind: ResponseKind,
        deadline: Option<Instant>,
        completion: Completion,
    ) -> Arc<Self> {
        let info = RequestInfo {
            method: request.method().clone(),
            uri: request.uri().clone(),
        };

        Arc::new(Self {
            id,
            kind,
            info,
            deadline,
            request: Mutex::new(Some(request)),
            state: Mutex::new(EntryState::Pending),
            completion: Mutex::new(Some(completion)),
            cancel: Notify::new(),
            started: Notify::new(),
        })
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn kind(&self) -> ResponseKind {
        self.kind
    }

    pub(crate) fn info(&self) -> &RequestInfo {
        &self.info
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub(crate) fn state(&self) -> EntryState {
        *self.state.lock().expect("lock poisoned")
    }

    pub(crate) fn mark_waiting(&self) {
        let mut state = self.state.lock().expect("lock poisoned");
        if *state == EntryState::Pending {
            *state = EntryState::Waiting;
        }
    }

    /// Move to `InFlight` and hand out the request.
    ///
    /// Returns `None` if the entry already reached a terminal state.
    pub(crate) fn begin(&self) -> Option<http::Request<Bytes>> {
        let mut state = self.state.lock().expect("lock poisoned");
        if !state.not_started() {
            return None;
        }
        *state = EntryState::InFlight;
        debug!("entry {} is in flight: {} {}", self.id, self.info.method, self.info.uri);
        let request = self.request.lock().expect("lock poisoned").take();
        drop(state);

        self.started.notify_waiters();
        request
    }

    /// Record the terminal state and fire the completion handler.
    ///
    /// Only the first call has any effect.
    pub(crate) fn settle(&self, result: Result<QueueResponse>) {
        let state = self.state.lock().expect("lock poisoned");
        if state.is_terminal() {
            return;
        }
        self.finish(state, result);
    }

    /// Ask the entry to cancel, see [`EntryHandle::cancel`].
    pub(crate) fn cancel(&self) -> bool {
        let state = self.state.lock().expect("lock poisoned");
        match *state {
            EntryState::Pending | EntryState::Waiting => {
                self.request.lock().expect("lock poisoned").take();
                self.finish(state, Err(Error::cancelled("request cancelled before start")));
                true
            }
            EntryState::InFlight => {
                drop(state);
                self.cancel.notify_one();
                true
            }
            _ => false,
        }
    }

    /// Fail a not yet started entry whose deadline passed.
    pub(crate) fn expire(&self) -> bool {
        let state = self.state.lock().expect("lock poisoned");
        if !state.not_started() {
            return false;
        }
        self.request.lock().expect("lock poisoned").take();
        self.finish(
            state,
            Err(Error::timeout("deadline elapsed before the request started")),
        );
        true
    }

    pub(crate) async fn cancelled(&self) {
        self.cancel.notified().await
    }

    /// Resolve once the entry is in flight or finished.
    pub(crate) async fn left_queue(&self) {
        let mut notified = std::pin::pin!(self.started.notified());
        notified.as_mut().enable();
        if !self.state().not_started() {
            return;
        }
        notified.await
    }

    // The state lock is released before the handler runs so that the handler may
    // look at the entry again.
    fn finish(&self, mut state: MutexGuard<'_, EntryState>, result: Result<QueueResponse>) {
        *state = match &result {
            Ok(_) => EntryState::Completed,
            Err(e) if e.kind() == ErrorKind::Cancelled => EntryState::Cancelled,
            Err(_) => EntryState::Failed,
        };
        debug!("entry {} settled as {:?}", self.id, *state);
        let completion = self.completion.lock().expect("lock poisoned").take();
        drop(state);

        self.started.notify_waiters();

        // A panicking handler must not take the dispatcher down with it.
        if let Some(completion) = completion {
            if catch_unwind(AssertUnwindSafe(|| completion(result))).is_err() {
                warn!("completion handler of entry {} panicked", self.id);
            }
        }
    }
}

/// Handle to a submitted entry, usable from callback based submissions.
#[derive(Clone, Debug)]
pub struct EntryHandle {
    entry: Arc<Entry>,
}

impl EntryHandle {
    pub(crate) fn new(entry: Arc<Entry>) -> Self {
        Self { entry }
    }

    /// Queue assigned id, increasing in submission order.
    pub fn id(&self) -> u64 {
        self.entry.id()
    }

    /// Current state of the entry.
    pub fn state(&self) -> EntryState {
        self.entry.state()
    }

    /// The request this entry was created for.
    pub fn request(&self) -> &RequestInfo {
        self.entry.info()
    }

    pub(crate) fn shared(&self) -> &Arc<Entry> {
        &self.entry
    }

    /// Ask the entry to cancel.
    ///
    /// Entries that have not started are settled with [`ErrorKind::Cancelled`] right
    /// away and never touch the network. In flight entries abort their transport on a
    /// best effort basis and still report `Cancelled`. Returns `false` if the entry
    /// was already finished.
    pub fn cancel(&self) -> bool {
        self.entry.cancel()
    }
}

/// Future of a submitted entry's result.
///
/// Dropping the handle does not cancel the entry.
#[derive(Debug)]
pub struct QueueHandle<T> {
    entry: EntryHandle,
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> QueueHandle<T> {
    pub(crate) fn new(entry: EntryHandle, rx: oneshot::Receiver<Result<T>>) -> Self {
        Self { entry, rx }
    }

    /// Queue assigned id, increasing in submission order.
    pub fn id(&self) -> u64 {
        self.entry.id()
    }

    /// Current state of the entry.
    pub fn state(&self) -> EntryState {
        self.entry.state()
    }

    /// See [`EntryHandle::cancel`].
    pub fn cancel(&self) -> bool {
        self.entry.cancel()
    }

    /// The underlying entry handle.
    pub fn entry(&self) -> &EntryHandle {
        &self.entry
    }

    /// Block the current thread until the result arrives.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context.
    pub fn wait_blocking(self) -> Result<T> {
        self.rx.blocking_recv().unwrap_or_else(|_| Err(dropped()))
    }
}

impl<T> Future for QueueHandle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or_else(|_| Err(dropped())))
    }
}

fn dropped() -> Error {
    Error::cancelled("request dropped before completion, the runtime may have shut down")
}
