// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration-driven pipelines.
//!
//! * [`load_config`] / [`load_and_validate_config`] - read YAML or TOML into a [`FactoryConfig`]
//! * [`validate_factory_config`] / [`validate_workers`] - accumulate every problem at once
//! * [`RuntimeBuilder`] - build a [`Factory`](crate::engine::Factory) from a config and a [`WorkerRegistry`]

mod loader;
mod registry;
mod runtime;
mod validation;

pub mod consts;

pub use loader::{load_and_validate_config, load_config, FactoryConfig, LineConfig};
pub use registry::WorkerRegistry;
pub use runtime::RuntimeBuilder;
pub use validation::{validate_factory_config, validate_workers};
