// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Conveyor: one processing stage.
//!
//! A conveyor is a bounded FIFO queue of parts plus a pool of workers draining
//! it. It owns its lifecycle (`New -> Running -> Stopped`), admission control
//! and, when a scale interval is configured, dynamic pool sizing.
//!
//! # Lifecycle and admission
//!
//! One async `RwLock` guards both the status flag and the queue's sending half.
//! `put_part` holds the read guard for the whole admission attempt; `stop`
//! takes the write guard, flips the status and drops the sender. A part can
//! therefore never be admitted once `stop` has begun closing the queue, and
//! every part admitted before that is still drained by the pool.
//!
//! Parts may be admitted while the conveyor is still `New`; they wait in the
//! queue until `run` starts the pool.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use the_conveyor::engine::Conveyor;
//! use the_conveyor::traits::{Done, FnWorker, Worker};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let worker = FnWorker::new(|part: String, done: Done, _next: Option<Arc<Conveyor<String>>>| async move {
//!     println!("handled {part}");
//!     done.done();
//! });
//!
//! let conveyor = Conveyor::builder("greetings", Arc::new(worker) as Arc<dyn Worker<String>>)
//!     .capacity(8)
//!     .workers(1, 4)
//!     .scale_every(Duration::from_millis(50))
//!     .build()
//!     .expect("valid conveyor");
//!
//! conveyor.run().await;
//! conveyor
//!     .put_part("hello".to_string(), Duration::from_millis(100))
//!     .await
//!     .expect("admitted");
//! conveyor.stop().await;
//! assert_eq!(conveyor.stats().completed, 1);
//! # }
//! ```

use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::consts::{DEFAULT_CAPACITY, DEFAULT_MAX_WORKERS, DEFAULT_MIN_WORKERS};
use crate::engine::pool::WorkerPool;
use crate::engine::stats::{ConveyorStats, Counters};
use crate::engine::Status;
use crate::errors::{ConveyorError, Rejected, ValidationError};
use crate::observability::messages::conveyor::{
    AdmissionRejected, ConveyorStarted, ConveyorStopped, ConveyorStopping, WorkerPoolResized,
};
use crate::observability::messages::StructuredLog;
use crate::traits::Worker;

struct Lifecycle<P> {
    status: Status,
    sender: Option<mpsc::Sender<P>>,
}

/// A bounded queue of parts drained by a managed worker pool.
pub struct Conveyor<P>
where
    P: Send + 'static,
{
    name: String,
    capacity: usize,
    scale_interval: Option<Duration>,
    next: Option<Arc<Conveyor<P>>>,
    lifecycle: RwLock<Lifecycle<P>>,
    pool: Arc<WorkerPool<P>>,
    counters: Arc<Counters>,
    shutdown: CancellationToken,
    drained: CancellationToken,
    scaler: Mutex<Option<JoinHandle<()>>>,
    started_at: OnceLock<Instant>,
    stopped_at: OnceLock<Instant>,
}

impl<P> Conveyor<P>
where
    P: Send + 'static,
{
    pub fn builder(name: impl Into<String>, worker: Arc<dyn Worker<P>>) -> ConveyorBuilder<P> {
        ConveyorBuilder {
            name: name.into(),
            worker,
            capacity: DEFAULT_CAPACITY,
            min_workers: DEFAULT_MIN_WORKERS,
            max_workers: DEFAULT_MAX_WORKERS,
            scale_interval: None,
            next: None,
        }
    }

    /// Enqueue `part`, waiting at most `timeout` for a free slot.
    ///
    /// On refusal the part comes back inside [`Rejected`]: `Full` when no slot
    /// freed in time, `Stopped` once `stop` has begun.
    pub async fn put_part(&self, part: P, timeout: Duration) -> Result<(), Rejected<P>> {
        let lifecycle = self.lifecycle.read().await;

        let sender = match (&lifecycle.status, &lifecycle.sender) {
            (Status::New | Status::Running, Some(sender)) => sender,
            _ => return Err(self.reject_stopped(part)),
        };

        match sender.send_timeout(part, timeout).await {
            Ok(()) => {
                self.counters.record_admitted();
                Ok(())
            }
            Err(SendTimeoutError::Timeout(part)) => {
                self.counters.record_rejected_full();
                let error = ConveyorError::Full {
                    line: self.name.clone(),
                    timeout,
                };
                AdmissionRejected {
                    line: &self.name,
                    error: &error,
                }
                .log();
                Err(Rejected::new(error, part))
            }
            Err(SendTimeoutError::Closed(part)) => Err(self.reject_stopped(part)),
        }
    }

    /// Start the pool (`min_workers` members) and the scaling loop, once.
    ///
    /// Calling `run` on a conveyor that is not `New` does nothing.
    pub async fn run(&self) {
        let mut lifecycle = self.lifecycle.write().await;
        if lifecycle.status != Status::New {
            return;
        }
        lifecycle.status = Status::Running;
        let _ = self.started_at.set(Instant::now());

        for _ in 0..self.pool.min() {
            self.pool.grow();
        }

        if let Some(every) = self.scale_interval {
            let handle = self.spawn_scaler(every);
            *self.scaler.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        }

        ConveyorStarted {
            line: &self.name,
            capacity: self.capacity,
            min_workers: self.pool.min(),
            max_workers: self.pool.max(),
            scale_interval: self.scale_interval,
        }
        .log();
    }

    /// Stop admitting, drain every queued part, and wait for all workers.
    ///
    /// Only the first call on a running conveyor does the work; a concurrent
    /// second call waits for that drain to finish. Calling `stop` on a
    /// conveyor that never ran does nothing.
    pub async fn stop(&self) {
        {
            let mut lifecycle = self.lifecycle.write().await;
            match lifecycle.status {
                Status::New => return,
                Status::Stopped => {
                    drop(lifecycle);
                    self.drained.cancelled().await;
                    return;
                }
                Status::Running => {}
            }
            lifecycle.status = Status::Stopped;
            lifecycle.sender = None;
        }

        let begun = Instant::now();
        ConveyorStopping {
            line: &self.name,
            queued: self.counters.queued(),
            pool_size: self.pool.size(),
        }
        .log();

        self.shutdown.cancel();
        let scaler = self.scaler.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = scaler {
            if let Err(e) = handle.await {
                tracing::warn!(line = %self.name, error = %e, "scaling loop ended abnormally");
            }
        }

        self.pool.drain().await;
        let _ = self.stopped_at.set(Instant::now());
        self.drained.cancel();

        ConveyorStopped {
            line: &self.name,
            completed: self.counters.completed(),
            duration: begun.elapsed(),
        }
        .log();
    }

    /// The stage this conveyor's workers forward to, if any.
    pub fn next(&self) -> Option<&Arc<Conveyor<P>>> {
        self.next.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn status(&self) -> Status {
        self.lifecycle.read().await.status
    }

    /// True once a `stop` has finished draining.
    pub fn is_drained(&self) -> bool {
        self.drained.is_cancelled()
    }

    /// Parts admitted and not yet claimed by a worker.
    pub fn queue_len(&self) -> usize {
        self.counters.queued()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    pub fn min_workers(&self) -> usize {
        self.pool.min()
    }

    pub fn max_workers(&self) -> usize {
        self.pool.max()
    }

    pub fn scale_interval(&self) -> Option<Duration> {
        self.scale_interval
    }

    pub fn worker_name(&self) -> &str {
        self.pool.worker_name()
    }

    pub fn stats(&self) -> ConveyorStats {
        self.counters.snapshot(self.pool.size())
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at.get().copied()
    }

    pub fn stopped_at(&self) -> Option<Instant> {
        self.stopped_at.get().copied()
    }

    /// Claim the next queued part directly, bypassing the pool.
    ///
    /// Waits for a part; returns `None` once `stop` has closed the queue and
    /// it is empty. Competes with pool members if the conveyor is running.
    pub async fn get_part(&self) -> Option<P> {
        let part = self.pool.get_part().await;
        if part.is_some() {
            self.counters.record_dequeued_direct();
        }
        part
    }

    fn reject_stopped(&self, part: P) -> Rejected<P> {
        self.counters.record_rejected_stopped();
        let error = ConveyorError::Stopped {
            line: self.name.clone(),
        };
        AdmissionRejected {
            line: &self.name,
            error: &error,
        }
        .log();
        Rejected::new(error, part)
    }

    fn spawn_scaler(&self, every: Duration) -> JoinHandle<()> {
        let pool = Arc::clone(&self.pool);
        let counters = Arc::clone(&self.counters);
        let shutdown = self.shutdown.clone();
        let line = self.name.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let queued = counters.queued();
                        if let Some(change) = pool.rebalance(queued) {
                            WorkerPoolResized {
                                line: &line,
                                change,
                                pool_size: pool.size(),
                                queued,
                            }
                            .log();
                        }
                    }
                }
            }
        })
    }
}

impl<P> std::fmt::Debug for Conveyor<P>
where
    P: Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conveyor")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("min_workers", &self.pool.min())
            .field("max_workers", &self.pool.max())
            .field("scale_interval", &self.scale_interval)
            .field("next", &self.next.as_ref().map(|next| next.name()))
            .finish_non_exhaustive()
    }
}

/// Configures and validates a [`Conveyor`].
pub struct ConveyorBuilder<P>
where
    P: Send + 'static,
{
    name: String,
    worker: Arc<dyn Worker<P>>,
    capacity: usize,
    min_workers: usize,
    max_workers: usize,
    scale_interval: Option<Duration>,
    next: Option<Arc<Conveyor<P>>>,
}

impl<P> ConveyorBuilder<P>
where
    P: Send + 'static,
{
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn workers(mut self, min: usize, max: usize) -> Self {
        self.min_workers = min;
        self.max_workers = max;
        self
    }

    /// Enable dynamic pool sizing, evaluated once per `every`.
    ///
    /// A zero interval leaves the pool fixed at `min_workers`.
    pub fn scale_every(mut self, every: Duration) -> Self {
        self.scale_interval = (!every.is_zero()).then_some(every);
        self
    }

    pub fn next(mut self, next: Arc<Conveyor<P>>) -> Self {
        self.next = Some(next);
        self
    }

    pub fn build(self) -> Result<Arc<Conveyor<P>>, ValidationError> {
        if self.capacity == 0 {
            return Err(ValidationError::ZeroCapacity { line: self.name });
        }
        if self.min_workers == 0 || self.min_workers > self.max_workers {
            return Err(ValidationError::InvalidWorkerBounds {
                line: self.name,
                min: self.min_workers,
                max: self.max_workers,
            });
        }

        let (sender, receiver) = mpsc::channel(self.capacity);
        let counters = Arc::new(Counters::default());
        let pool = WorkerPool::new(
            self.name.clone(),
            (self.min_workers, self.max_workers),
            self.worker,
            self.next.clone(),
            receiver,
            Arc::clone(&counters),
        );

        Ok(Arc::new(Conveyor {
            name: self.name,
            capacity: self.capacity,
            scale_interval: self.scale_interval,
            next: self.next,
            lifecycle: RwLock::new(Lifecycle {
                status: Status::New,
                sender: Some(sender),
            }),
            pool: Arc::new(pool),
            counters,
            shutdown: CancellationToken::new(),
            drained: CancellationToken::new(),
            scaler: Mutex::new(None),
            started_at: OnceLock::new(),
            stopped_at: OnceLock::new(),
        }))
    }
}
