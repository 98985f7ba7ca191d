// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for factory registration and coordinated lifecycle events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A line was added to the factory.
///
/// # Log Level
/// `debug!` - Configuration detail
pub struct LineRegistered<'a> {
    pub line: &'a str,
    pub line_count: usize,
}

impl Display for LineRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered line '{}' ({} lines total)",
            self.line, self.line_count
        )
    }
}

impl StructuredLog for LineRegistered<'_> {
    fn log(&self) {
        tracing::debug!(line = self.line, line_count = self.line_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("line_registered", span_name = name, line = self.line)
    }
}

/// Every line started, leaves first.
///
/// # Log Level
/// `info!` - Important operational event
pub struct FactoryStarted {
    pub line_count: usize,
    pub root_count: usize,
    pub leaf_count: usize,
    pub duration: Duration,
}

impl Display for FactoryStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Factory started {} lines ({} entry, {} terminal) in {:?}",
            self.line_count, self.root_count, self.leaf_count, self.duration
        )
    }
}

impl StructuredLog for FactoryStarted {
    fn log(&self) {
        tracing::info!(
            line_count = self.line_count,
            root_count = self.root_count,
            leaf_count = self.leaf_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "factory_started",
            span_name = name,
            line_count = self.line_count,
            root_count = self.root_count,
            leaf_count = self.leaf_count,
        )
    }
}

/// Every line drained and stopped, roots first.
///
/// # Log Level
/// `info!` - Important operational event
pub struct FactoryStopped {
    pub line_count: usize,
    pub duration: Duration,
}

impl Display for FactoryStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Factory stopped {} lines in {:?}",
            self.line_count, self.duration
        )
    }
}

impl StructuredLog for FactoryStopped {
    fn log(&self) {
        tracing::info!(
            line_count = self.line_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "factory_stopped",
            span_name = name,
            line_count = self.line_count,
        )
    }
}
