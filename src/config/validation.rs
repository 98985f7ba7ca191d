// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation for pipeline integrity.
//!
//! Checks run in order and accumulate, so a user sees every problem at once:
//!
//! 1. **Uniqueness**: every line name appears once
//! 2. **Line settings**: capacity above zero, `1 <= min_workers <= max_workers`
//! 3. **References**: every `next` names a declared line
//! 4. **Cycles**: following `next` never loops (skipped while references are
//!    unresolved, since the chain is not well defined then)
//!
//! Worker names are checked separately by [`validate_workers`], against the
//! registry that will build the pipeline.

use std::collections::{HashMap, HashSet};

use crate::config::{FactoryConfig, WorkerRegistry};
use crate::engine::graph::find_cycles;
use crate::errors::ValidationError;

/// Validate the structure of a pipeline configuration.
///
/// ```rust
/// use the_conveyor::config::{validate_factory_config, FactoryConfig};
/// use the_conveyor::errors::ValidationError;
///
/// let cfg = FactoryConfig::from_yaml_str(r#"
/// lines:
///   - name: a
///     worker: reverse_text
///     next: missing
/// "#).unwrap();
///
/// let errors = validate_factory_config(&cfg).unwrap_err();
/// assert_eq!(errors, vec![ValidationError::UnresolvedNext {
///     line: "a".to_string(),
///     next: "missing".to_string(),
/// }]);
/// ```
pub fn validate_factory_config(config: &FactoryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    errors.extend(duplicate_lines(config));
    errors.extend(line_settings(config));

    let unresolved = unresolved_next(config);
    if unresolved.is_empty() {
        errors.extend(cycles(config));
    } else {
        errors.extend(unresolved);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate that every line's worker is registered.
pub fn validate_workers<P>(
    config: &FactoryConfig,
    registry: &WorkerRegistry<P>,
) -> Result<(), Vec<ValidationError>>
where
    P: Send + 'static,
{
    let errors: Vec<ValidationError> = config
        .lines
        .iter()
        .filter(|line| !registry.contains(&line.worker))
        .map(|line| ValidationError::UnknownWorker {
            line: line.name.clone(),
            worker: line.worker.clone(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn duplicate_lines(config: &FactoryConfig) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    config
        .lines
        .iter()
        .filter(|line| !seen.insert(line.name.as_str()))
        .map(|line| ValidationError::DuplicateLine {
            line: line.name.clone(),
        })
        .collect()
}

fn line_settings(config: &FactoryConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for line in &config.lines {
        if line.capacity == 0 {
            errors.push(ValidationError::ZeroCapacity {
                line: line.name.clone(),
            });
        }
        let (min, max) = (line.min_workers, line.max_workers());
        if min == 0 || min > max {
            errors.push(ValidationError::InvalidWorkerBounds {
                line: line.name.clone(),
                min,
                max,
            });
        }
    }
    errors
}

fn unresolved_next(config: &FactoryConfig) -> Vec<ValidationError> {
    let names: HashSet<&str> = config.lines.iter().map(|line| line.name.as_str()).collect();
    config
        .lines
        .iter()
        .filter_map(|line| {
            let next = line.next.as_deref()?;
            (!names.contains(next)).then(|| ValidationError::UnresolvedNext {
                line: line.name.clone(),
                next: next.to_string(),
            })
        })
        .collect()
}

fn cycles(config: &FactoryConfig) -> Vec<ValidationError> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, line) in config.lines.iter().enumerate() {
        index.entry(line.name.as_str()).or_insert(i);
    }

    let next = |i: usize| -> Option<usize> {
        config.lines[i]
            .next
            .as_deref()
            .and_then(|name| index.get(name).copied())
    };

    find_cycles(config.lines.len(), next)
        .into_iter()
        .map(|cycle| ValidationError::CyclicPipeline {
            cycle: cycle
                .into_iter()
                .map(|i| config.lines[i].name.clone())
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::RecordingWorker;
    use std::sync::Arc;

    fn config(yaml: &str) -> FactoryConfig {
        FactoryConfig::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_pipeline_passes() {
        let cfg = config(
            r#"
lines:
  - name: ingest
    worker: reverse_text
    next: store
  - name: replay
    worker: reverse_text
    next: store
  - name: store
    worker: collector
"#,
        );
        assert!(validate_factory_config(&cfg).is_ok());
    }

    #[test]
    fn test_errors_accumulate() {
        let cfg = config(
            r#"
lines:
  - name: a
    worker: reverse_text
    capacity: 0
  - name: a
    worker: reverse_text
    min_workers: 3
    max_workers: 2
"#,
        );

        let errors = validate_factory_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicateLine {
                    line: "a".to_string()
                },
                ValidationError::ZeroCapacity {
                    line: "a".to_string()
                },
                ValidationError::InvalidWorkerBounds {
                    line: "a".to_string(),
                    min: 3,
                    max: 2
                },
            ]
        );
    }

    #[test]
    fn test_cycle_reports_path() {
        let cfg = config(
            r#"
lines:
  - name: entry
    worker: reverse_text
    next: a
  - name: a
    worker: reverse_text
    next: b
  - name: b
    worker: reverse_text
    next: a
"#,
        );

        let errors = validate_factory_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::CyclicPipeline {
                cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()]
            }]
        );
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let cfg = config("lines:\n  - name: loop\n    worker: reverse_text\n    next: loop\n");
        let errors = validate_factory_config(&cfg).unwrap_err();
        assert!(matches!(&errors[..], [ValidationError::CyclicPipeline { cycle }] if cycle.len() == 2));
    }

    #[test]
    fn test_unknown_worker() {
        let cfg = config("lines:\n  - name: a\n    worker: nope\n");
        let mut registry: WorkerRegistry<u32> = WorkerRegistry::new();
        registry.register("recording", Arc::new(RecordingWorker::<u32>::new()));

        assert_eq!(
            validate_workers(&cfg, &registry).unwrap_err(),
            vec![ValidationError::UnknownWorker {
                line: "a".to_string(),
                worker: "nope".to_string()
            }]
        );
    }
}
