// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The worker contract: what a conveyor does with each part it dequeues.
//!
//! A [`Worker`] receives one part, a [`Done`] completion handle and the
//! conveyor's downstream stage (if any). The conveyor gates dispatch on a pool
//! slot; the slot comes back when the worker signals `Done`.
//!
//! `Done` is move-only and consumed by [`Done::done`], so it cannot be
//! signalled twice. Dropping it unsignalled (early return, `?`, a panic inside
//! the worker) frees the slot too, so every dispatch frees exactly one slot.
//! The pool runs each invocation as its own task, so a panicking worker loses
//! only the part it was handed.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OwnedSemaphorePermit;
use tokio_util::task::task_tracker::TaskTrackerToken;

use crate::engine::stats::Counters;
use crate::engine::Conveyor;

/// Caller-defined processing applied to one part at a time.
///
/// Forwarding is the worker's decision: call `next.put_part(..)` and handle
/// the `Full`/`Stopped` rejection however the stage needs to. The engine never
/// retries a forward on the worker's behalf.
#[async_trait]
pub trait Worker<P>: Send + Sync
where
    P: Send + 'static,
{
    async fn working(&self, part: P, done: Done, next: Option<Arc<Conveyor<P>>>);

    fn name(&self) -> &str {
        "worker"
    }
}

/// Completion handle for one dispatched part.
#[must_use = "a worker must signal `Done` (or drop it) to free its pool slot"]
pub struct Done {
    inner: Option<Slot>,
}

struct Slot {
    _permit: OwnedSemaphorePermit,
    _token: TaskTrackerToken,
    counters: Arc<Counters>,
}

impl Done {
    pub(crate) fn new(
        permit: OwnedSemaphorePermit,
        token: TaskTrackerToken,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            inner: Some(Slot {
                _permit: permit,
                _token: token,
                counters,
            }),
        }
    }

    /// A handle bound to no conveyor, for exercising workers directly.
    pub fn detached() -> Self {
        Self { inner: None }
    }

    /// Signal that the part has been handled and free its pool slot.
    pub fn done(mut self) {
        self.release(true);
    }

    fn release(&mut self, signalled: bool) {
        if let Some(slot) = self.inner.take() {
            slot.counters.record_finished(signalled);
        }
    }
}

impl Drop for Done {
    fn drop(&mut self) {
        self.release(false);
    }
}

impl std::fmt::Debug for Done {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Done")
            .field("pending", &self.inner.is_some())
            .finish()
    }
}

/// Adapts an async closure into a [`Worker`].
///
/// Each invocation runs as its own tokio task, so `working` returns as soon as
/// the part is handed over and the pool can dispatch again once a slot frees.
pub struct FnWorker<F> {
    name: String,
    func: Arc<F>,
}

impl<F> FnWorker<F> {
    pub fn new(func: F) -> Self {
        Self::named("fn_worker", func)
    }

    pub fn named(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }
}

#[async_trait]
impl<P, F, Fut> Worker<P> for FnWorker<F>
where
    P: Send + 'static,
    F: Fn(P, Done, Option<Arc<Conveyor<P>>>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn working(&self, part: P, done: Done, next: Option<Arc<Conveyor<P>>>) {
        tokio::spawn((self.func)(part, done, next));
    }

    fn name(&self) -> &str {
        &self.name
    }
}
