// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::config::{join_errors, ValidationError};

/// Errors surfaced by [`Factory`](crate::engine::Factory) registration, lookup and startup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactoryError {
    /// Lines can only be added before the factory runs
    #[error("Factory has already started; line '{0}' was not added")]
    AlreadyRunning(String),

    #[error("Line '{0}' is already registered")]
    DuplicateLine(String),

    #[error("Line '{0}' is not registered")]
    LineNotFound(String),

    #[error("Pipeline is invalid:\n{}", join_errors(.0))]
    InvalidPipeline(Vec<ValidationError>),
}
