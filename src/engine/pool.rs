// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker pool behind a conveyor.
//!
//! Each pool member is a tokio task that loops: acquire a pool slot, claim the
//! next queued part, run the worker on it as a tracked task and await that
//! task. A panicking worker therefore ends only its own invocation.
//!
//! A slot is an owned semaphore permit carried inside the part's [`Done`]
//! handle, so the semaphore caps how many worker invocations run at once no
//! matter how many members are polling the queue.
//!
//! Every member and every outstanding `Done` is registered with one
//! [`TaskTracker`]; [`WorkerPool::drain`] closes it and waits, which is the join
//! barrier the conveyor's stop path blocks on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, Mutex as AsyncMutex, Semaphore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::engine::stats::Counters;
use crate::engine::Conveyor;
use crate::observability::messages::conveyor::PoolChange;
use crate::observability::messages::worker::WorkerPanicked;
use crate::observability::messages::StructuredLog;
use crate::traits::{Done, Worker};

struct Member {
    id: u64,
    retire: CancellationToken,
}

/// Takes a member off the roster however its task ends.
struct MemberGuard<P>
where
    P: Send + 'static,
{
    pool: Arc<WorkerPool<P>>,
    id: u64,
}

impl<P> Drop for MemberGuard<P>
where
    P: Send + 'static,
{
    fn drop(&mut self) {
        self.pool.members().retain(|member| member.id != self.id);
        tracing::trace!(line = %self.pool.line, member = self.id, "pool member exited");
    }
}

pub(crate) struct WorkerPool<P>
where
    P: Send + 'static,
{
    line: String,
    min: usize,
    max: usize,
    worker: Arc<dyn Worker<P>>,
    next: Option<Arc<Conveyor<P>>>,
    receiver: AsyncMutex<mpsc::Receiver<P>>,
    slots: Arc<Semaphore>,
    tracker: TaskTracker,
    members: Mutex<Vec<Member>>,
    counters: Arc<Counters>,
    next_id: AtomicU64,
}

impl<P> WorkerPool<P>
where
    P: Send + 'static,
{
    pub fn new(
        line: String,
        (min, max): (usize, usize),
        worker: Arc<dyn Worker<P>>,
        next: Option<Arc<Conveyor<P>>>,
        receiver: mpsc::Receiver<P>,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            line,
            min,
            max,
            worker,
            next,
            receiver: AsyncMutex::new(receiver),
            slots: Arc::new(Semaphore::new(max)),
            tracker: TaskTracker::new(),
            members: Mutex::new(Vec::with_capacity(max)),
            counters,
            next_id: AtomicU64::new(0),
        }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn worker_name(&self) -> &str {
        self.worker.name()
    }

    pub fn size(&self) -> usize {
        self.members().len()
    }

    /// Adds one member unless the pool is already at `max`.
    pub fn grow(self: &Arc<Self>) -> bool {
        let mut members = self.members();
        if members.len() >= self.max {
            return false;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let retire = CancellationToken::new();
        members.push(Member {
            id,
            retire: retire.clone(),
        });
        drop(members);

        let pool = Arc::clone(self);
        self.tracker.spawn(async move { pool.drive(id, retire).await });
        true
    }

    /// Retires the youngest member unless the pool is already at `min`.
    ///
    /// The member finishes the dispatch it is in the middle of before exiting.
    pub fn shrink(&self) -> bool {
        let mut members = self.members();
        if members.len() <= self.min {
            return false;
        }
        match members.pop() {
            Some(member) => {
                member.retire.cancel();
                true
            }
            None => false,
        }
    }

    /// One scaling step: grow on backlog, shrink when idle, at most one change.
    pub fn rebalance(self: &Arc<Self>, queued: usize) -> Option<PoolChange> {
        if queued > 0 {
            self.grow().then_some(PoolChange::Grew)
        } else {
            self.shrink().then_some(PoolChange::Shrank)
        }
    }

    /// Next queued part, or `None` once the queue is closed and empty.
    pub async fn get_part(&self) -> Option<P> {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await
    }

    /// Waits for every member to exit and every outstanding `Done` to fire.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    async fn drive(self: Arc<Self>, id: u64, retire: CancellationToken) {
        let _member = MemberGuard {
            pool: Arc::clone(&self),
            id,
        };
        tracing::trace!(line = %self.line, member = id, "pool member started");

        loop {
            let permit = tokio::select! {
                biased;
                _ = retire.cancelled() => break,
                permit = Arc::clone(&self.slots).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let part = tokio::select! {
                biased;
                _ = retire.cancelled() => break,
                part = self.get_part() => match part {
                    Some(part) => part,
                    None => break,
                },
            };

            self.counters.record_dequeued();
            let done = Done::new(permit, self.tracker.token(), Arc::clone(&self.counters));
            self.dispatch(part, done).await;
        }
    }

    /// Runs one worker invocation as its own tracked task, so a panicking
    /// worker costs only its part and the member keeps draining.
    async fn dispatch(&self, part: P, done: Done) {
        let worker = Arc::clone(&self.worker);
        let next = self.next.clone();
        let invocation = self
            .tracker
            .spawn(async move { worker.working(part, done, next).await });

        if let Err(e) = invocation.await {
            WorkerPanicked {
                line: &self.line,
                worker: self.worker.name(),
                error: &e,
            }
            .log();
        }
    }

    fn members(&self) -> MutexGuard<'_, Vec<Member>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
