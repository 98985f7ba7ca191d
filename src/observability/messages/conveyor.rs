// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for conveyor lifecycle, admission and worker pool events.

use crate::errors::ConveyorError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Conveyor transitioned New -> Running.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConveyorStarted<'a> {
    pub line: &'a str,
    pub capacity: usize,
    pub min_workers: usize,
    pub max_workers: usize,
    pub scale_interval: Option<Duration>,
}

impl Display for ConveyorStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Conveyor '{}' started: capacity={}, workers={}..={}",
            self.line, self.capacity, self.min_workers, self.max_workers
        )?;
        match self.scale_interval {
            Some(interval) => write!(f, ", scaling every {:?}", interval),
            None => write!(f, ", fixed pool"),
        }
    }
}

impl StructuredLog for ConveyorStarted<'_> {
    fn log(&self) {
        tracing::info!(
            line = self.line,
            capacity = self.capacity,
            min_workers = self.min_workers,
            max_workers = self.max_workers,
            scale_interval = ?self.scale_interval,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "conveyor",
            span_name = name,
            line = self.line,
            capacity = self.capacity,
            max_workers = self.max_workers,
        )
    }
}

/// Conveyor stopped admitting and began draining.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConveyorStopping<'a> {
    pub line: &'a str,
    pub queued: usize,
    pub pool_size: usize,
}

impl Display for ConveyorStopping<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Conveyor '{}' stopping: draining {} queued parts with {} workers",
            self.line, self.queued, self.pool_size
        )
    }
}

impl StructuredLog for ConveyorStopping<'_> {
    fn log(&self) {
        tracing::info!(
            line = self.line,
            queued = self.queued,
            pool_size = self.pool_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "conveyor_stopping",
            span_name = name,
            line = self.line,
            queued = self.queued,
        )
    }
}

/// Conveyor drained and every worker exited.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConveyorStopped<'a> {
    pub line: &'a str,
    pub completed: u64,
    pub duration: Duration,
}

impl Display for ConveyorStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Conveyor '{}' stopped: {} parts completed, drain took {:?}",
            self.line, self.completed, self.duration
        )
    }
}

impl StructuredLog for ConveyorStopped<'_> {
    fn log(&self) {
        tracing::info!(
            line = self.line,
            completed = self.completed,
            drain_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "conveyor_stopped",
            span_name = name,
            line = self.line,
            completed = self.completed,
        )
    }
}

/// Which way a scaling tick moved the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolChange {
    Grew,
    Shrank,
}

/// Scaling tick added or retired one worker.
///
/// # Log Level
/// `debug!` - Routine, potentially frequent
pub struct WorkerPoolResized<'a> {
    pub line: &'a str,
    pub change: PoolChange,
    pub pool_size: usize,
    pub queued: usize,
}

impl Display for WorkerPoolResized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let verb = match self.change {
            PoolChange::Grew => "grew",
            PoolChange::Shrank => "shrank",
        };
        write!(
            f,
            "Conveyor '{}' worker pool {} to {} ({} queued)",
            self.line, verb, self.pool_size, self.queued
        )
    }
}

impl StructuredLog for WorkerPoolResized<'_> {
    fn log(&self) {
        tracing::debug!(
            line = self.line,
            change = ?self.change,
            pool_size = self.pool_size,
            queued = self.queued,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "worker_pool",
            span_name = name,
            line = self.line,
            pool_size = self.pool_size,
        )
    }
}

/// A part was refused at admission.
///
/// # Log Level
/// `debug!` - Expected under load, surfaced to the caller anyway
pub struct AdmissionRejected<'a> {
    pub line: &'a str,
    pub error: &'a ConveyorError,
}

impl Display for AdmissionRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Admission rejected on '{}': {}", self.line, self.error)
    }
}

impl StructuredLog for AdmissionRejected<'_> {
    fn log(&self) {
        tracing::debug!(
            line = self.line,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "admission_rejected",
            span_name = name,
            line = self.line,
            error = %self.error,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_started_message_mentions_scaling() {
        let fixed = ConveyorStarted {
            line: "a",
            capacity: 2,
            min_workers: 1,
            max_workers: 1,
            scale_interval: None,
        };
        assert_eq!(
            fixed.to_string(),
            "Conveyor 'a' started: capacity=2, workers=1..=1, fixed pool"
        );

        let scaling = ConveyorStarted {
            scale_interval: Some(Duration::from_millis(100)),
            ..fixed
        };
        assert!(scaling.to_string().ends_with("scaling every 100ms"));
    }

    #[test]
    fn test_pool_resized_message() {
        let msg = WorkerPoolResized {
            line: "b",
            change: PoolChange::Shrank,
            pool_size: 2,
            queued: 0,
        };
        assert_eq!(msg.to_string(), "Conveyor 'b' worker pool shrank to 2 (0 queued)");
    }
}
