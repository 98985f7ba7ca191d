// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use tokio::sync::Mutex;

use crate::engine::{Conveyor, Graph, Status};
use crate::errors::{FactoryError, ValidationError};
use crate::observability::messages::factory::{FactoryStarted, FactoryStopped, LineRegistered};
use crate::observability::messages::validation::log_validation_errors;
use crate::observability::messages::StructuredLog;

struct Registry<P>
where
    P: Send + 'static,
{
    status: Status,
    lines: BTreeMap<String, Arc<Conveyor<P>>>,
}

/// Named registry of conveyors with a coordinated, graph-ordered lifecycle.
///
/// Lines are registered while the factory is `New`. `run` starts them
/// leaf-first, `stop` drains them root-first. Both are serialized, so a `stop`
/// racing a `run` waits for the start to finish before tearing down.
pub struct Factory<P>
where
    P: Send + 'static,
{
    registry: RwLock<Registry<P>>,
    transition: Mutex<Option<Arc<Graph<P>>>>,
}

impl<P> Default for Factory<P>
where
    P: Send + 'static,
{
    fn default() -> Self {
        Self {
            registry: RwLock::new(Registry {
                status: Status::New,
                lines: BTreeMap::new(),
            }),
            transition: Mutex::new(None),
        }
    }
}

impl<P> Factory<P>
where
    P: Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `conveyor` under `name`. Only allowed while the factory is `New`.
    pub fn add_line(
        &self,
        name: impl Into<String>,
        conveyor: Arc<Conveyor<P>>,
    ) -> Result<(), FactoryError> {
        let name = name.into();
        let mut registry = self.write();

        if registry.status != Status::New {
            return Err(FactoryError::AlreadyRunning(name));
        }
        if registry.lines.contains_key(&name) {
            return Err(FactoryError::DuplicateLine(name));
        }

        registry.lines.insert(name.clone(), conveyor);
        LineRegistered {
            line: &name,
            line_count: registry.lines.len(),
        }
        .log();
        Ok(())
    }

    pub fn get_line(&self, name: &str) -> Option<Arc<Conveyor<P>>> {
        self.read().lines.get(name).cloned()
    }

    /// Like [`get_line`](Self::get_line), but a miss is an error.
    pub fn line(&self, name: &str) -> Result<Arc<Conveyor<P>>, FactoryError> {
        self.get_line(name)
            .ok_or_else(|| FactoryError::LineNotFound(name.to_string()))
    }

    /// Validate the pipeline and start every line, leaves first.
    ///
    /// A line forwarding to an unregistered conveyor, or a cycle of `next`
    /// links, fails with [`FactoryError::InvalidPipeline`] and leaves the
    /// factory `New`. Calling `run` again once started does nothing.
    pub async fn run(&self) -> Result<(), FactoryError> {
        let mut current = self.transition.lock().await;
        let begun = Instant::now();

        let graph = {
            let mut registry = self.write();
            if registry.status != Status::New {
                return Ok(());
            }

            let graph = Graph::from_conveyors(registry.lines.values());
            let mut errors = unresolved_next(&registry.lines);
            if let Err(cycles) = graph.validate() {
                errors.extend(cycles);
            }
            if !errors.is_empty() {
                log_validation_errors(&errors);
                return Err(FactoryError::InvalidPipeline(errors));
            }

            registry.status = Status::Running;
            Arc::new(graph)
        };

        graph.run_from_leaves().await;

        FactoryStarted {
            line_count: graph.len(),
            root_count: graph.compute_roots().len(),
            leaf_count: graph.compute_leaves().len(),
            duration: begun.elapsed(),
        }
        .log();

        *current = Some(graph);
        Ok(())
    }

    /// Stop every line root-first and wait until all of them have drained.
    ///
    /// Does nothing unless the factory is running; a second caller waits for
    /// the first stop to finish.
    pub async fn stop(&self) {
        let mut current = self.transition.lock().await;
        let begun = Instant::now();

        {
            let mut registry = self.write();
            if registry.status != Status::Running {
                return;
            }
            registry.status = Status::Stopped;
        }

        if let Some(graph) = current.take() {
            graph.stop_from_roots().await;
            FactoryStopped {
                line_count: graph.len(),
                duration: begun.elapsed(),
            }
            .log();
        }
    }

    pub fn status(&self) -> Status {
        self.read().status
    }

    pub fn line_names(&self) -> Vec<String> {
        self.read().lines.keys().cloned().collect()
    }

    /// Names of the pipeline entry lines.
    pub fn roots(&self) -> Vec<String> {
        self.graph_names(|graph| graph.compute_roots())
    }

    /// Names of the terminal lines.
    pub fn leaves(&self) -> Vec<String> {
        self.graph_names(|graph| graph.compute_leaves())
    }

    fn graph_names(&self, select: impl Fn(&Graph<P>) -> Vec<usize>) -> Vec<String> {
        let registry = self.read();
        let graph = Graph::from_conveyors(registry.lines.values());

        let mut names: Vec<String> = select(&graph)
            .into_iter()
            .map(|index| registered_name(&registry.lines, graph.conveyor(index)))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry<P>> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry<P>> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P> std::fmt::Debug for Factory<P>
where
    P: Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.read();
        f.debug_struct("Factory")
            .field("status", &registry.status)
            .field("lines", &registry.lines.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn unresolved_next<P>(lines: &BTreeMap<String, Arc<Conveyor<P>>>) -> Vec<ValidationError>
where
    P: Send + 'static,
{
    lines
        .iter()
        .filter_map(|(name, conveyor)| {
            let next = conveyor.next()?;
            let registered = lines.values().any(|line| Arc::ptr_eq(line, next));
            (!registered).then(|| ValidationError::UnresolvedNext {
                line: name.clone(),
                next: next.name().to_string(),
            })
        })
        .collect()
}

/// The registry key for `conveyor`, falling back to the conveyor's own name.
fn registered_name<P>(lines: &BTreeMap<String, Arc<Conveyor<P>>>, conveyor: &Arc<Conveyor<P>>) -> String
where
    P: Send + 'static,
{
    lines
        .iter()
        .find(|(_, line)| Arc::ptr_eq(line, conveyor))
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| conveyor.name().to_string())
}
