// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Lock-free counters shared by a conveyor, its pool tasks and outstanding `Done` handles.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    admitted: AtomicU64,
    dequeued: AtomicU64,
    completed: AtomicU64,
    abandoned: AtomicU64,
    rejected_full: AtomicU64,
    rejected_stopped: AtomicU64,
    in_flight: AtomicUsize,
}

impl Counters {
    pub fn record_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dequeued(&self) {
        self.dequeued.fetch_add(1, Ordering::Relaxed);
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    /// A part claimed by a caller instead of a pool member; nothing is in flight.
    pub fn record_dequeued_direct(&self) {
        self.dequeued.fetch_add(1, Ordering::Relaxed);
    }

    /// `signalled` is false when a `Done` was dropped without being called.
    pub fn record_finished(&self, signalled: bool) {
        if signalled {
            self.completed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.abandoned.fetch_add(1, Ordering::Relaxed);
        }
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn record_rejected_full(&self) {
        self.rejected_full.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_stopped(&self) {
        self.rejected_stopped.fetch_add(1, Ordering::Relaxed);
    }

    /// Parts admitted but not yet claimed by a worker.
    ///
    /// A worker can dequeue a part a moment before the admitting call records it,
    /// so the difference saturates at zero.
    pub fn queued(&self) -> usize {
        let admitted = self.admitted.load(Ordering::Relaxed);
        let dequeued = self.dequeued.load(Ordering::Relaxed);
        admitted.saturating_sub(dequeued) as usize
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self, pool_size: usize) -> ConveyorStats {
        ConveyorStats {
            admitted: self.admitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            rejected_full: self.rejected_full.load(Ordering::Relaxed),
            rejected_stopped: self.rejected_stopped.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
            queued: self.queued(),
            pool_size,
        }
    }
}

/// Point-in-time view of a conveyor's throughput and pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConveyorStats {
    /// Parts accepted by `put_part`.
    pub admitted: u64,
    /// Worker invocations that called `Done::done`.
    pub completed: u64,
    /// Worker invocations that dropped their `Done` without calling it.
    pub abandoned: u64,
    pub rejected_full: u64,
    pub rejected_stopped: u64,
    /// Parts handed to a worker whose `Done` has not fired yet.
    pub in_flight: usize,
    pub queued: usize,
    pub pool_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_saturates_when_dequeue_races_admission() {
        let counters = Counters::default();
        counters.record_dequeued();
        assert_eq!(counters.queued(), 0);

        counters.record_admitted();
        counters.record_admitted();
        assert_eq!(counters.queued(), 1);
    }

    #[test]
    fn test_finished_splits_completed_and_abandoned() {
        let counters = Counters::default();
        counters.record_admitted();
        counters.record_admitted();
        counters.record_dequeued();
        counters.record_dequeued();
        counters.record_finished(true);
        counters.record_finished(false);

        let stats = counters.snapshot(1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.abandoned, 1);
        assert_eq!(stats.in_flight, 0);
        assert_eq!(stats.queued, 0);
        assert_eq!(stats.pool_size, 1);
    }
}
