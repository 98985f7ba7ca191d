// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for built-in worker events.

use crate::errors::ConveyorError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tokio::task::JoinError;
use tracing::Span;

/// A worker picked up one part.
///
/// # Log Level
/// `trace!` - Per-part detail; its span wraps the whole invocation
pub struct PartReceived<'a> {
    pub worker: &'a str,
    pub input_size: usize,
}

impl Display for PartReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' received part ({} bytes)",
            self.worker, self.input_size
        )
    }
}

impl StructuredLog for PartReceived<'_> {
    fn log(&self) {
        tracing::trace!(worker = self.worker, input_size = self.input_size, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "part_received",
            span_name = name,
            worker = self.worker,
            input_size = self.input_size,
        )
    }
}

/// A worker finished transforming one part.
///
/// # Log Level
/// `debug!` - Per-part detail
pub struct PartProcessed<'a> {
    pub worker: &'a str,
    pub input_size: usize,
    pub output_size: usize,
    pub duration: Duration,
}

impl Display for PartProcessed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' processed part: {} -> {} bytes in {:?}",
            self.worker, self.input_size, self.output_size, self.duration
        )
    }
}

impl StructuredLog for PartProcessed<'_> {
    fn log(&self) {
        tracing::debug!(
            worker = self.worker,
            input_size = self.input_size,
            output_size = self.output_size,
            duration_us = self.duration.as_micros() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "part_processed",
            span_name = name,
            worker = self.worker,
            input_size = self.input_size,
        )
    }
}

/// Downstream line refused a forwarded part; the worker dropped it.
///
/// # Log Level
/// `warn!` - Data left the pipeline
pub struct ForwardRejected<'a> {
    pub worker: &'a str,
    pub error: &'a ConveyorError,
}

impl Display for ForwardRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' could not forward part, dropping it: {}",
            self.worker, self.error
        )
    }
}

impl StructuredLog for ForwardRejected<'_> {
    fn log(&self) {
        tracing::warn!(worker = self.worker, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "forward_rejected",
            span_name = name,
            worker = self.worker,
            error = %self.error,
        )
    }
}

/// A worker invocation panicked; its part is counted as abandoned.
///
/// # Log Level
/// `error!` - Worker bug
pub struct WorkerPanicked<'a> {
    pub line: &'a str,
    pub worker: &'a str,
    pub error: &'a JoinError,
}

impl Display for WorkerPanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' on line '{}' failed mid-part: {}",
            self.worker, self.line, self.error
        )
    }
}

impl StructuredLog for WorkerPanicked<'_> {
    fn log(&self) {
        tracing::error!(
            line = self.line,
            worker = self.worker,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "worker_panicked",
            span_name = name,
            line = self.line,
            worker = self.worker,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_received_message() {
        let msg = PartReceived {
            worker: "reverse_text",
            input_size: 5,
        };
        assert_eq!(msg.to_string(), "Worker 'reverse_text' received part (5 bytes)");
    }

    #[test]
    fn test_forward_rejected_message() {
        let error = ConveyorError::Stopped {
            line: "reverse".to_string(),
        };
        let msg = ForwardRejected {
            worker: "change_text_case",
            error: &error,
        };
        assert_eq!(
            msg.to_string(),
            "Worker 'change_text_case' could not forward part, dropping it: Conveyor 'reverse' is stopped"
        );
    }
}
