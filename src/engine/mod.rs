// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Staged processing engine.
//!
//! * [`Conveyor`] - bounded queue plus an elastic worker pool, one per stage
//! * [`Graph`] - start/stop ordering over conveyors linked by `next`
//! * [`Factory`] - named registry driving the coordinated lifecycle

pub mod conveyor;
pub mod factory;
pub mod graph;
pub(crate) mod pool;
pub mod stats;
pub mod status;
#[cfg(test)]
mod integration_tests;

pub use conveyor::{Conveyor, ConveyorBuilder};
pub use factory::Factory;
pub use graph::Graph;
pub use stats::ConveyorStats;
pub use status::Status;
