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
use azstore_core::{EntryState, ErrorKind, QueueConfig, QueueResponse, ResponseKind};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test(start_paused = true)]
async fn test_ordered_completes_in_submission_order() {
    let stub = StubHttpSend::new(|req| Reply::ok("done").with_delay(path_delay(req)));
    let queue = init_queue(&stub, QueueConfig::ordered());

    let (tx, mut rx) = mpsc::unbounded_channel();
    // Earlier entries are slower, a concurrent queue would finish them last.
    for (i, ms) in [50, 40, 30, 20, 10].into_iter().enumerate() {
        let tx = tx.clone();
        queue
            .submit(request(&format!("/slow/{ms}/{i}")))
            .with_callback(ResponseKind::Data, move |res| {
                assert!(res.is_ok());
                tx.send(i).unwrap();
            });
    }

    let mut order = Vec::new();
    for _ in 0..5 {
        order.push(rx.recv().await.unwrap());
    }

    assert_eq!(order, vec![0, 1, 2, 3, 4]);
    assert_eq!(stub.max_in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_ordered_next_entry_waits() {
    let stub = StubHttpSend::new(|req| Reply::ok("").with_delay(path_delay(req)));
    let queue = init_queue(&stub, QueueConfig::ordered());

    let first = queue.submit(request("/slow/100/a")).no_response();
    let second = queue.submit(request("/b")).no_response();

    assert_eq!(second.state(), EntryState::Waiting);
    assert_eq!(queue.outstanding(), 2);

    first.await.unwrap();
    second.await.unwrap();
    assert_eq!(stub.seen_paths(), vec!["/slow/100/a", "/b"]);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_waiting_entry_never_sent() {
    let stub = StubHttpSend::new(|req| Reply::ok("").with_delay(path_delay(req)));
    let queue = init_queue(&stub, QueueConfig::ordered());

    let first = queue.submit(request("/slow/100/a")).data();
    let second = queue.submit(request("/b")).data();

    assert!(second.cancel());
    assert_eq!(second.state(), EntryState::Cancelled);

    let err = second.await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);

    first.await.unwrap();
    // Give the driver a chance to walk past the cancelled entry.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(stub.seen_paths(), vec!["/slow/100/a"]);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_expires_while_waiting() {
    let stub = StubHttpSend::new(|req| Reply::ok("").with_delay(path_delay(req)));
    let queue = init_queue(&stub, QueueConfig::ordered());

    let first = queue.submit(request("/slow/1000/a")).no_response();
    let second = queue
        .submit(request("/b"))
        .with_deadline(Duration::from_millis(100))
        .no_response();

    let err = second.await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);

    first.await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(stub.seen_paths(), vec!["/slow/1000/a"]);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_all_ordered() {
    let stub = StubHttpSend::new(|req| Reply::ok("").with_delay(path_delay(req)));
    let queue = init_queue(&stub, QueueConfig::ordered());

    let handles: Vec<_> = (0..3)
        .map(|i| queue.submit(request(&format!("/slow/1000/{i}"))).no_response())
        .collect();
    // Let the first entry reach the network.
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(queue.cancel_all(), 3);
    for handle in handles {
        assert_eq!(handle.await.unwrap_err().kind(), ErrorKind::Cancelled);
    }
    assert_eq!(stub.seen_paths(), vec!["/slow/1000/0"]);
}

#[tokio::test(start_paused = true)]
async fn test_callback_sees_failure_and_lane_continues() {
    let stub = StubHttpSend::new(|req| match req.uri().path() {
        "/missing" => Reply::status(http::StatusCode::NOT_FOUND),
        _ => Reply::ok("<Ok/>"),
    });
    let queue = init_queue(&stub, QueueConfig::ordered());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let failed = tx.clone();
    queue
        .submit(request("/missing"))
        .with_callback(ResponseKind::NoResponse, move |res| {
            failed.send(res.map(|_| ()).unwrap_err().kind()).unwrap();
        });
    let doc = queue.submit(request("/present")).response(ResponseKind::Document);

    assert_eq!(rx.recv().await.unwrap(), ErrorKind::ServiceError);
    match doc.await.unwrap() {
        QueueResponse::Document(el) => assert_eq!(el.name, "Ok"),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_panicking_callback_keeps_lane_running() {
    let stub = StubHttpSend::new(|_| Reply::ok(""));
    let queue = init_queue(&stub, QueueConfig::ordered());

    let first = queue
        .submit(request("/a"))
        .with_callback(ResponseKind::NoResponse, |_| panic!("callback failure"));
    let second = queue.submit(request("/b")).no_response();

    tokio::time::timeout(Duration::from_secs(2), second)
        .await
        .expect("second entry must finish")
        .unwrap();
    assert_eq!(first.state(), EntryState::Completed);
    assert_eq!(stub.seen_paths(), vec!["/a", "/b"]);
    assert_eq!(queue.outstanding(), 0);
}
