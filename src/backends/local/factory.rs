// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use super::workers::*;
use crate::config::WorkerRegistry;
use crate::traits::Worker;

/// Factory for the built-in (in-process) text workers
pub struct LocalWorkerFactory;

impl LocalWorkerFactory {
    /// Create a worker by its configuration name.
    ///
    /// - "change_text_case_upper" -> ChangeTextCaseWorker (uppercase)
    /// - "change_text_case_lower" -> ChangeTextCaseWorker (lowercase)
    /// - "change_text_case_proper" -> ChangeTextCaseWorker (proper case)
    /// - "change_text_case_title" -> ChangeTextCaseWorker (title case)
    /// - "reverse_text" -> ReverseTextWorker
    /// - "prefix_suffix_adder" -> PrefixSuffixAdderWorker (brackets)
    /// - "collector" -> CollectorWorker appending to `collected`
    ///
    /// `forward_timeout` bounds each forward to the next line.
    pub fn create_worker(
        name: &str,
        forward_timeout: Duration,
        collected: &Collected,
    ) -> Result<Arc<dyn Worker<String>>, String> {
        let worker: Arc<dyn Worker<String>> = match name {
            "change_text_case_upper" => Arc::new(ChangeTextCaseWorker::upper().with_forward_timeout(forward_timeout)),
            "change_text_case_lower" => Arc::new(ChangeTextCaseWorker::lower().with_forward_timeout(forward_timeout)),
            "change_text_case_proper" => Arc::new(ChangeTextCaseWorker::proper().with_forward_timeout(forward_timeout)),
            "change_text_case_title" => Arc::new(ChangeTextCaseWorker::title().with_forward_timeout(forward_timeout)),
            "reverse_text" => Arc::new(ReverseTextWorker::new().with_forward_timeout(forward_timeout)),
            "prefix_suffix_adder" => Arc::new(
                PrefixSuffixAdderWorker::with_prefix_and_suffix("[", "]")
                    .with_forward_timeout(forward_timeout),
            ),
            "collector" => Arc::new(CollectorWorker::with_handle(collected.clone())),
            _ => return Err(format!("Unknown local worker implementation: '{}'", name)),
        };
        Ok(worker)
    }

    /// List all available local worker implementations
    pub fn list_available_implementations() -> Vec<&'static str> {
        vec![
            "change_text_case_upper",
            "change_text_case_lower",
            "change_text_case_proper",
            "change_text_case_title",
            "reverse_text",
            "prefix_suffix_adder",
            "collector",
        ]
    }

    pub fn is_implementation_available(name: &str) -> bool {
        Self::list_available_implementations().contains(&name)
    }

    /// A registry holding every local worker, plus the handle shared by the
    /// `collector` sinks.
    pub fn registry(forward_timeout: Duration) -> (WorkerRegistry<String>, Collected) {
        let collected = Collected::default();
        let mut registry = WorkerRegistry::new();

        for name in Self::list_available_implementations() {
            match Self::create_worker(name, forward_timeout, &collected) {
                Ok(worker) => {
                    registry.register(name, worker);
                }
                Err(e) => tracing::warn!(worker = name, error = %e, "skipping local worker"),
            }
        }

        (registry, collected)
    }
}
