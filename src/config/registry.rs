// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::traits::Worker;

/// Resolves the worker names used in configuration into worker instances
pub struct WorkerRegistry<P>
where
    P: Send + 'static,
{
    workers: BTreeMap<String, Arc<dyn Worker<P>>>,
}

impl<P> Default for WorkerRegistry<P>
where
    P: Send + 'static,
{
    fn default() -> Self {
        Self {
            workers: BTreeMap::new(),
        }
    }
}

impl<P> WorkerRegistry<P>
where
    P: Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `worker` under `name`, returning the worker it replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        worker: Arc<dyn Worker<P>>,
    ) -> Option<Arc<dyn Worker<P>>> {
        self.workers.insert(name.into(), worker)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Worker<P>>> {
        self.workers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.workers.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.workers.keys().map(String::as_str).collect()
    }
}
