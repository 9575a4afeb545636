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

use super::{init_queue, path_delay, request, Reply, StubHttpSend};
use azstore_core::{
    Context, EntryState, ErrorKind, QueueConfig, RequestQueue, ResponseKind,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test(start_paused = true)]
async fn test_concurrent_each_entry_completes_once() {
    let stub = StubHttpSend::new(|req| Reply::ok("done").with_delay(path_delay(req)));
    let queue = init_queue(&stub, QueueConfig::concurrent());

    let calls = Arc::new(AtomicUsize::new(0));
    let (tx, mut rx) = mpsc::unbounded_channel();
    for (i, ms) in [50, 40, 30, 20, 10].into_iter().enumerate() {
        let calls = calls.clone();
        let tx = tx.clone();
        queue
            .submit(request(&format!("/slow/{ms}/{i}")))
            .with_callback(ResponseKind::Data, move |res| {
                assert!(res.is_ok());
                calls.fetch_add(1, Ordering::SeqCst);
                tx.send(i).unwrap();
            });
    }

    let mut done = Vec::new();
    for _ in 0..5 {
        done.push(rx.recv().await.unwrap());
    }
    tokio::time::sleep(Duration::from_secs(1)).await;

    done.sort();
    assert_eq!(done, vec![0, 1, 2, 3, 4]);
    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert!(stub.max_in_flight() > 1);
    assert_eq!(queue.outstanding(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_elapsed_in_flight() {
    let stub = StubHttpSend::new(|_| Reply::ok("late").with_delay(Duration::from_secs(5)));
    let queue = init_queue(&stub, QueueConfig::concurrent());

    let err = queue
        .submit(request("/slow"))
        .with_deadline(Duration::from_millis(100))
        .data()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(err.to_string().contains("url: https://acct.blob.core.windows.net/slow"));
}

#[tokio::test(start_paused = true)]
async fn test_default_deadline_from_config() {
    let stub = StubHttpSend::new(|_| Reply::ok("late").with_delay(Duration::from_secs(5)));
    let queue = init_queue(
        &stub,
        QueueConfig::concurrent().with_default_deadline(Duration::from_millis(100)),
    );

    let err = queue.submit(request("/slow")).no_response().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_in_flight() {
    let stub = StubHttpSend::new(|_| Reply::ok("late").with_delay(Duration::from_secs(5)));
    let queue = init_queue(&stub, QueueConfig::concurrent());

    let handle = queue.submit(request("/slow")).data();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(handle.state(), EntryState::InFlight);
    assert_eq!(queue.in_flight(), 1);

    assert!(handle.cancel());
    let entry = handle.entry().clone();
    let err = handle.await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(entry.state(), EntryState::Cancelled);
    assert!(!entry.cancel());
}

#[test]
fn test_wait_blocking_outside_runtime() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    let stub = StubHttpSend::new(|_| Reply::ok("hello"));
    let ctx = Context::new().with_http_send(stub.clone());
    let queue = RequestQueue::with_runtime(ctx, QueueConfig::concurrent(), rt.handle().clone());

    let body = queue.submit(request("/c/b")).data().wait_blocking().unwrap();
    assert_eq!(body.as_ref(), b"hello");
}

#[tokio::test(start_paused = true)]
async fn test_panicking_callback_is_released() {
    let stub = StubHttpSend::new(|_| Reply::ok(""));
    let queue = init_queue(&stub, QueueConfig::concurrent());

    let handle = queue
        .submit(request("/a"))
        .with_callback(ResponseKind::NoResponse, |_| panic!("callback failure"));
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(handle.state(), EntryState::Completed);
    assert_eq!(queue.outstanding(), 0);
    assert_eq!(queue.in_flight(), 0);
}
