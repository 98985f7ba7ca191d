// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Admission errors returned by [`Conveyor::put_part`](crate::engine::Conveyor::put_part).

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Why a conveyor refused a part.
///
/// `Full` is recoverable: the caller decides whether to add capacity and retry.
/// `Stopped` is terminal for that conveyor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConveyorError {
    #[error("Conveyor '{line}' is full: no slot freed within {timeout:?}")]
    Full { line: String, timeout: Duration },

    #[error("Conveyor '{line}' is stopped")]
    Stopped { line: String },
}

impl ConveyorError {
    pub fn is_full(&self) -> bool {
        matches!(self, ConveyorError::Full { .. })
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, ConveyorError::Stopped { .. })
    }
}

/// A refused admission. Hands the part back so a rejection never loses it.
pub struct Rejected<P> {
    pub error: ConveyorError,
    pub part: P,
}

impl<P> Rejected<P> {
    pub(crate) fn new(error: ConveyorError, part: P) -> Self {
        Self { error, part }
    }

    pub fn error(&self) -> &ConveyorError {
        &self.error
    }

    pub fn into_part(self) -> P {
        self.part
    }

    pub fn into_parts(self) -> (ConveyorError, P) {
        (self.error, self.part)
    }
}

impl<P> fmt::Debug for Rejected<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<P> fmt::Display for Rejected<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "part rejected: {}", self.error)
    }
}

impl<P> std::error::Error for Rejected<P> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
