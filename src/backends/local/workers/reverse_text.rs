// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::transform_and_forward;
use crate::config::consts::DEFAULT_ADMISSION_TIMEOUT;
use crate::engine::Conveyor;
use crate::traits::{Done, Worker};

/// Reverse Text worker - reverses each part by character and forwards it
pub struct ReverseTextWorker {
    forward_timeout: Duration,
}

impl ReverseTextWorker {
    pub fn new() -> Self {
        Self {
            forward_timeout: DEFAULT_ADMISSION_TIMEOUT,
        }
    }

    pub fn with_forward_timeout(mut self, timeout: Duration) -> Self {
        self.forward_timeout = timeout;
        self
    }
}

impl Default for ReverseTextWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Worker<String> for ReverseTextWorker {
    async fn working(&self, part: String, done: Done, next: Option<Arc<Conveyor<String>>>) {
        transform_and_forward(self.name(), part, done, next, self.forward_timeout, |text| {
            text.chars().rev().collect()
        })
        .await;
    }

    fn name(&self) -> &str {
        "reverse_text"
    }
}
