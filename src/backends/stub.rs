// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test-only workers.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::engine::Conveyor;
use crate::traits::{Done, Worker};

/// Records every part it sees, in the order it saw them.
pub struct RecordingWorker<P> {
    parts: Arc<Mutex<Vec<P>>>,
}

impl<P> RecordingWorker<P> {
    pub fn new() -> Self {
        Self {
            parts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.parts.lock().unwrap().len()
    }
}

impl<P: Clone> RecordingWorker<P> {
    pub fn parts(&self) -> Vec<P> {
        self.parts.lock().unwrap().clone()
    }
}

impl<P> Clone for RecordingWorker<P> {
    fn clone(&self) -> Self {
        Self {
            parts: Arc::clone(&self.parts),
        }
    }
}

#[async_trait]
impl<P> Worker<P> for RecordingWorker<P>
where
    P: Send + 'static,
{
    async fn working(&self, part: P, done: Done, _next: Option<Arc<Conveyor<P>>>) {
        self.parts.lock().unwrap().push(part);
        done.done();
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Sleeps for a fixed time per part before signalling.
#[derive(Clone)]
pub struct SlowWorker {
    delay: Duration,
    handled: Arc<AtomicUsize>,
}

impl SlowWorker {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            handled: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn handled(&self) -> usize {
        self.handled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<P> Worker<P> for SlowWorker
where
    P: Send + 'static,
{
    async fn working(&self, _part: P, done: Done, _next: Option<Arc<Conveyor<P>>>) {
        tokio::time::sleep(self.delay).await;
        self.handled.fetch_add(1, Ordering::SeqCst);
        done.done();
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Never signals; lets the `Done` handle drop instead.
pub struct DoneDroppingWorker;

impl DoneDroppingWorker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<P> Worker<P> for DoneDroppingWorker
where
    P: Send + 'static,
{
    async fn working(&self, _part: P, done: Done, _next: Option<Arc<Conveyor<P>>>) {
        drop(done);
    }
}

/// Forwards every part unchanged to the next stage, recording rejections.
#[derive(Clone)]
pub struct ForwardingWorker {
    timeout: Duration,
    rejected: Arc<AtomicUsize>,
}

impl ForwardingWorker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            rejected: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<P> Worker<P> for ForwardingWorker
where
    P: Send + 'static,
{
    async fn working(&self, part: P, done: Done, next: Option<Arc<Conveyor<P>>>) {
        if let Some(next) = next {
            if next.put_part(part, self.timeout).await.is_err() {
                self.rejected.fetch_add(1, Ordering::SeqCst);
            }
        }
        done.done();
    }

    fn name(&self) -> &str {
        "forwarding"
    }
}

/// Panics inline on one chosen part and records every other part.
#[derive(Clone)]
pub struct PanickingWorker {
    poison: u32,
    recorder: RecordingWorker<u32>,
}

impl PanickingWorker {
    pub fn new(poison: u32) -> Self {
        Self {
            poison,
            recorder: RecordingWorker::new(),
        }
    }

    pub fn parts(&self) -> Vec<u32> {
        self.recorder.parts()
    }
}

#[async_trait]
impl Worker<u32> for PanickingWorker {
    async fn working(&self, part: u32, done: Done, next: Option<Arc<Conveyor<u32>>>) {
        if part == self.poison {
            panic!("poisoned part {part}");
        }
        self.recorder.working(part, done, next).await;
    }

    fn name(&self) -> &str {
        "panicking"
    }
}
