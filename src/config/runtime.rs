// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{validate_factory_config, validate_workers, FactoryConfig, LineConfig, WorkerRegistry};
use crate::engine::{Conveyor, Factory};
use crate::errors::{ConfigError, ValidationError};
use crate::observability::messages::validation::log_validation_errors;

/// Pipeline runtime builder - turns configuration into a ready-to-run factory.
///
/// Validates the configuration (structure and worker names), builds every
/// conveyor with its worker from the registry, and registers each under its
/// line name. Conveyors are built leaf-first, so each `next` exists before
/// the line that forwards to it.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use the_conveyor::backends::local::LocalWorkerFactory;
/// use the_conveyor::config::{FactoryConfig, RuntimeBuilder};
/// use the_conveyor::engine::Status;
///
/// let cfg = FactoryConfig::from_yaml_str(r#"
/// lines:
///   - name: reverse
///     worker: reverse_text
///     next: sink
///   - name: sink
///     worker: collector
/// "#).unwrap();
///
/// let (workers, _collected) = LocalWorkerFactory::registry(cfg.admission_timeout());
/// let factory = RuntimeBuilder::from_config(&cfg, &workers).unwrap();
///
/// assert_eq!(factory.status(), Status::New);
/// assert_eq!(factory.roots(), vec!["reverse"]);
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build a factory holding one conveyor per configured line.
    ///
    /// # Arguments
    /// * `cfg` - Line definitions
    /// * `registry` - Worker implementations, looked up by each line's `worker`
    ///
    /// # Returns
    /// A `Factory` in the `New` state, ready for `run`
    pub fn from_config<P>(
        cfg: &FactoryConfig,
        registry: &WorkerRegistry<P>,
    ) -> Result<Factory<P>, ConfigError>
    where
        P: Send + 'static,
    {
        let mut errors = validate_factory_config(cfg).err().unwrap_or_default();
        errors.extend(validate_workers(cfg, registry).err().unwrap_or_default());
        if !errors.is_empty() {
            log_validation_errors(&errors);
            return Err(ConfigError::Validation(errors));
        }

        let by_name: HashMap<&str, &LineConfig> = cfg
            .lines
            .iter()
            .map(|line| (line.name.as_str(), line))
            .collect();
        let mut built: HashMap<&str, Arc<Conveyor<P>>> = HashMap::new();

        for line in &cfg.lines {
            // Walk down to the first already-built line (or the leaf), then
            // build back up.
            let mut chain = Vec::new();
            let mut cursor = Some(line);
            while let Some(current) = cursor {
                if built.contains_key(current.name.as_str()) {
                    break;
                }
                chain.push(current);
                cursor = current
                    .next
                    .as_deref()
                    .and_then(|next| by_name.get(next).copied());
            }

            for current in chain.into_iter().rev() {
                let conveyor = build_line(current, registry, &built)?;
                built.insert(current.name.as_str(), conveyor);
            }
        }

        let factory = Factory::new();
        for line in &cfg.lines {
            if let Some(conveyor) = built.remove(line.name.as_str()) {
                factory.add_line(line.name.clone(), conveyor)?;
            }
        }
        Ok(factory)
    }
}

fn build_line<P>(
    line: &LineConfig,
    registry: &WorkerRegistry<P>,
    built: &HashMap<&str, Arc<Conveyor<P>>>,
) -> Result<Arc<Conveyor<P>>, ConfigError>
where
    P: Send + 'static,
{
    let worker = registry.get(&line.worker).ok_or_else(|| {
        ConfigError::Validation(vec![ValidationError::UnknownWorker {
            line: line.name.clone(),
            worker: line.worker.clone(),
        }])
    })?;

    let mut builder = Conveyor::builder(line.name.clone(), worker)
        .capacity(line.capacity)
        .workers(line.min_workers, line.max_workers());
    if let Some(every) = line.scale_interval() {
        builder = builder.scale_every(every);
    }
    if let Some(next) = &line.next {
        let downstream = built.get(next.as_str()).ok_or_else(|| {
            ConfigError::Validation(vec![ValidationError::UnresolvedNext {
                line: line.name.clone(),
                next: next.clone(),
            }])
        })?;
        builder = builder.next(Arc::clone(downstream));
    }

    builder
        .build()
        .map_err(|e| ConfigError::Validation(vec![e]))
}
