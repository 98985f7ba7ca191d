// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod conveyor;
mod factory;

pub use config::{ConfigError, ValidationError};
pub use conveyor::{ConveyorError, Rejected};
pub use factory::FactoryError;
