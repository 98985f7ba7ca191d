// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::engine::Conveyor;
use crate::traits::{Done, Worker};

/// Shared view of everything a [`CollectorWorker`] has received.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    parts: Arc<Mutex<Vec<String>>>,
}

impl Collected {
    pub fn parts(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, part: String) {
        self.lock().push(part);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.parts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Collector worker - a sink that keeps every part it receives
pub struct CollectorWorker {
    collected: Collected,
}

impl CollectorWorker {
    pub fn new() -> Self {
        Self::with_handle(Collected::default())
    }

    /// A collector appending to an existing handle.
    pub fn with_handle(collected: Collected) -> Self {
        Self { collected }
    }

    pub fn collected(&self) -> Collected {
        self.collected.clone()
    }
}

impl Default for CollectorWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Worker<String> for CollectorWorker {
    async fn working(&self, part: String, done: Done, _next: Option<Arc<Conveyor<String>>>) {
        self.collected.push(part);
        done.done();
    }

    fn name(&self) -> &str {
        "collector"
    }
}
