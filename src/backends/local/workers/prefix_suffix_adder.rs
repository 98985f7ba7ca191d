// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::transform_and_forward;
use crate::config::consts::DEFAULT_ADMISSION_TIMEOUT;
use crate::engine::Conveyor;
use crate::traits::{Done, Worker};

/// Configuration for the Prefix/Suffix Adder worker
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PrefixSuffixConfig {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

/// Prefix/Suffix Adder worker - wraps each part and forwards it
pub struct PrefixSuffixAdderWorker {
    config: PrefixSuffixConfig,
    forward_timeout: Duration,
}

impl PrefixSuffixAdderWorker {
    pub fn new(config: PrefixSuffixConfig) -> Self {
        Self {
            config,
            forward_timeout: DEFAULT_ADMISSION_TIMEOUT,
        }
    }

    pub fn with_prefix_and_suffix(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::new(PrefixSuffixConfig {
            prefix: Some(prefix.into()),
            suffix: Some(suffix.into()),
        })
    }

    pub fn with_forward_timeout(mut self, timeout: Duration) -> Self {
        self.forward_timeout = timeout;
        self
    }

    fn wrap(&self, text: &str) -> String {
        let prefix = self.config.prefix.as_deref().unwrap_or_default();
        let suffix = self.config.suffix.as_deref().unwrap_or_default();
        format!("{prefix}{text}{suffix}")
    }
}

#[async_trait]
impl Worker<String> for PrefixSuffixAdderWorker {
    async fn working(&self, part: String, done: Done, next: Option<Arc<Conveyor<String>>>) {
        transform_and_forward(self.name(), part, done, next, self.forward_timeout, |text| {
            self.wrap(text)
        })
        .await;
    }

    fn name(&self) -> &str {
        "prefix_suffix_adder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_handles_missing_sides() {
        let both = PrefixSuffixAdderWorker::with_prefix_and_suffix("[", "]");
        assert_eq!(both.wrap("part"), "[part]");

        let prefix_only = PrefixSuffixAdderWorker::new(PrefixSuffixConfig {
            prefix: Some(">> ".to_string()),
            suffix: None,
        });
        assert_eq!(prefix_only.wrap("part"), ">> part");
    }
}
