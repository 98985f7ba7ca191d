// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use super::factory::FactoryError;

/// Errors that can occur while validating a pipeline layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Two lines were registered under the same name
    DuplicateLine {
        /// The duplicate line name
        line: String,
    },
    /// A line forwards to a downstream line that is not part of the pipeline
    UnresolvedNext {
        /// The line whose `next` could not be resolved
        line: String,
        /// The downstream name that couldn't be found
        next: String,
    },
    /// Following `next` links from some line loops back onto itself
    CyclicPipeline {
        /// The cycle path, first line repeated at the end
        cycle: Vec<String>,
    },
    /// A line was configured with a zero-sized queue
    ZeroCapacity {
        /// The offending line
        line: String,
    },
    /// Worker bounds violate `1 <= min <= max`
    InvalidWorkerBounds {
        line: String,
        min: usize,
        max: usize,
    },
    /// A line names a worker implementation that isn't registered
    UnknownWorker {
        line: String,
        worker: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateLine { line } => {
                write!(f, "Duplicate line name: '{}'", line)
            }
            ValidationError::UnresolvedNext { line, next } => {
                write!(
                    f,
                    "Line '{}' forwards to '{}' which is not registered",
                    line, next
                )
            }
            ValidationError::CyclicPipeline { cycle } => {
                write!(f, "Cyclic pipeline detected: {}", cycle.join(" -> "))
            }
            ValidationError::ZeroCapacity { line } => {
                write!(f, "Line '{}' must have a queue capacity greater than zero", line)
            }
            ValidationError::InvalidWorkerBounds { line, min, max } => {
                write!(
                    f,
                    "Line '{}' has invalid worker bounds min={} max={} (expected 1 <= min <= max)",
                    line, min, max
                )
            }
            ValidationError::UnknownWorker { line, worker } => {
                write!(f, "Line '{}' uses unknown worker '{}'", line, worker)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a pipeline configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported config format '{0}' (expected .yaml, .yml or .toml)")]
    UnsupportedFormat(String),

    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Factory(#[from] FactoryError),
}

pub(crate) fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
