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

//! Ordered execution: entries run strictly one at a time in submission order.
//!
//! Unfinished entries live in a `VecDeque`, the front one is being driven. It is
//! only popped after its completion handler has returned, so completions are
//! delivered in submission order.

use super::entry::Entry;
use super::execute::run_entry;
use super::Inner;
use log::{debug, warn};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::time::sleep_until;

#[derive(Debug, Default)]
pub(crate) struct Lane {
    entries: VecDeque<Arc<Entry>>,
    running: bool,
}

impl Lane {
    /// Entries not yet driven, the current one included.
    pub(crate) fn outstanding(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn unfinished(&self) -> impl Iterator<Item = &Arc<Entry>> {
        self.entries.iter()
    }
}

pub(crate) fn push(inner: &Arc<Inner>, entry: Arc<Entry>) {
    let start = {
        let mut lane = inner.lane.lock().expect("lock poisoned");
        if lane.running {
            entry.mark_waiting();
        }
        lane.entries.push_back(entry.clone());
        !std::mem::replace(&mut lane.running, true)
    };

    // The watchdog only guards the wait, run_entry enforces the deadline in flight.
    if let Some(deadline) = entry.deadline() {
        let entry = entry.clone();
        inner.runtime.spawn(async move {
            tokio::select! {
                _ = sleep_until(deadline) => {
                    if entry.expire() {
                        warn!("entry {} expired while waiting in the ordered lane", entry.id());
                    }
                }
                _ = entry.left_queue() => {}
            }
        });
    }

    if start {
        debug!("ordered lane idle, starting driver for entry {}", entry.id());
        let inner = inner.clone();
        inner.runtime.clone().spawn(drive(inner));
    }
}

async fn drive(inner: Arc<Inner>) {
    loop {
        let entry = {
            let mut lane = inner.lane.lock().expect("lock poisoned");
            match lane.entries.front() {
                Some(entry) => entry.clone(),
                None => {
                    lane.running = false;
                    debug!("ordered lane drained, driver stopped");
                    return;
                }
            }
        };

        run_entry(&inner.ctx, &inner.config, &entry).await;

        inner.lane.lock().expect("lock poisoned").entries.pop_front();
    }
}

