// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_ADMISSION_TIMEOUT_MS, DEFAULT_CAPACITY, DEFAULT_MAX_WORKERS, DEFAULT_MIN_WORKERS,
};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Pipeline configuration for a factory.
///
/// Declares every line (conveyor) the factory owns, which worker drains it and
/// which line it forwards to. Typically loaded from YAML; TOML is accepted too.
///
/// # Fields
/// * `admission_timeout_ms` - Default `put_part` timeout for callers and for
///   workers forwarding downstream (optional, defaults to 1000 ms)
/// * `lines` - The conveyors, in any order
///
/// # Example
/// ```yaml
/// admission_timeout_ms: 500
/// lines:
///   - name: uppercase
///     worker: change_text_case_upper
///     capacity: 64
///     min_workers: 1
///     max_workers: 4
///     scale_interval_ms: 100
///     next: reverse
///   - name: reverse
///     worker: reverse_text
///     next: sink
///   - name: sink
///     worker: collector
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FactoryConfig {
    #[serde(default)]
    pub admission_timeout_ms: Option<u64>,
    pub lines: Vec<LineConfig>,
}

impl FactoryConfig {
    pub fn admission_timeout(&self) -> Duration {
        Duration::from_millis(
            self.admission_timeout_ms
                .unwrap_or(DEFAULT_ADMISSION_TIMEOUT_MS),
        )
    }

    pub fn line(&self, name: &str) -> Option<&LineConfig> {
        self.lines.iter().find(|line| line.name == name)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// One conveyor in the pipeline.
///
/// # Fields
/// * `name` - Unique line name, used for lookup and in `next` references
/// * `worker` - Name of the worker implementation in the worker registry
/// * `capacity` - Bounded queue size (defaults to 64)
/// * `min_workers` - Pool lower bound (defaults to 1)
/// * `max_workers` - Pool upper bound (defaults to `min_workers`)
/// * `scale_interval_ms` - How often to re-evaluate the pool size; absent
///   keeps the pool fixed at `min_workers`
/// * `next` - Downstream line that workers forward to (optional)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LineConfig {
    pub name: String,
    pub worker: String,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_min_workers")]
    pub min_workers: usize,
    #[serde(default)]
    pub max_workers: Option<usize>,
    #[serde(default)]
    pub scale_interval_ms: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
}

impl LineConfig {
    pub fn max_workers(&self) -> usize {
        self.max_workers
            .unwrap_or_else(|| self.min_workers.max(DEFAULT_MAX_WORKERS))
    }

    pub fn scale_interval(&self) -> Option<Duration> {
        self.scale_interval_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_min_workers() -> usize {
    DEFAULT_MIN_WORKERS
}

/// Load a config file, choosing the parser by extension.
///
/// `.yaml`/`.yml` (or no extension) parse as YAML, `.toml` as TOML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FactoryConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        None | Some("yaml") | Some("yml") => FactoryConfig::from_yaml_str(&content),
        Some("toml") => FactoryConfig::from_toml_str(&content),
        Some(other) => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// Load a config file and check its structure.
///
/// Reports every structural problem at once; worker names are checked later,
/// against a registry, by [`RuntimeBuilder`](crate::config::RuntimeBuilder).
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<FactoryConfig, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_factory_config(&cfg).map_err(ConfigError::Validation)?;
    Ok(cfg)
}
