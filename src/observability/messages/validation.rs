// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline validation errors.
//!
//! This module contains message types for logging events related to:
//! * Cyclic `next` chains
//! * Lines forwarding to unregistered lines
//! * Duplicate line names

use crate::errors::ValidationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Cyclic `next` chain detected.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_conveyor::observability::messages::validation::CyclicPipelineDetected;
///
/// let cycle = vec!["a", "b", "a"];
/// let msg = CyclicPipelineDetected { cycle: &cycle };
///
/// assert_eq!(msg.to_string(), "Cyclic pipeline detected: a -> b -> a");
/// ```
pub struct CyclicPipelineDetected<'a> {
    pub cycle: &'a [&'a str],
}

impl Display for CyclicPipelineDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic pipeline detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CyclicPipelineDetected<'_> {
    fn log(&self) {
        tracing::error!(
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
        )
    }
}

/// A line forwards to a line that is not registered.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnresolvedNext<'a> {
    pub line: &'a str,
    pub next: &'a str,
}

impl Display for UnresolvedNext<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Line '{}' forwards to unregistered line '{}'",
            self.line, self.next
        )
    }
}

impl StructuredLog for UnresolvedNext<'_> {
    fn log(&self) {
        tracing::error!(line = self.line, next = self.next, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "span_name",
            name = name,
            line = self.line,
            next = self.next,
        )
    }
}

/// Duplicate line name detected.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DuplicateLineName<'a> {
    pub line: &'a str,
}

impl Display for DuplicateLineName<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Duplicate line name: '{}'", self.line)
    }
}

impl StructuredLog for DuplicateLineName<'_> {
    fn log(&self) {
        tracing::error!(line = self.line, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(tracing::Level::ERROR, "span_name", name = name, line = self.line)
    }
}

/// Log every validation error through its matching message type.
pub fn log_validation_errors(errors: &[ValidationError]) {
    for error in errors {
        match error {
            ValidationError::CyclicPipeline { cycle } => {
                let cycle: Vec<&str> = cycle.iter().map(String::as_str).collect();
                CyclicPipelineDetected { cycle: &cycle }.log();
            }
            ValidationError::UnresolvedNext { line, next } => {
                UnresolvedNext { line, next }.log();
            }
            ValidationError::DuplicateLine { line } => {
                DuplicateLineName { line }.log();
            }
            other => tracing::error!(error = %other, "{}", other),
        }
    }
}
