// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `conveyor` - conveyor lifecycle, admission and pool scaling events
//! * `factory` - factory lifecycle events
//! * `validation` - pipeline validation errors
//! * `worker` - built-in worker processing and forwarding events

use std::fmt::Display;
use tracing::Span;

pub mod conveyor;
pub mod factory;
pub mod validation;
pub mod worker;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the message as a tracing event at its documented level.
    fn log(&self);

    /// Open a span carrying the same fields as the message.
    fn span(&self, name: &str) -> Span;
}
