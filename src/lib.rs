// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The Conveyor: a staged, backpressured task engine.
//!
//! Parts flow through named conveyors. Each conveyor is a bounded queue
//! drained by an elastic worker pool, and workers may forward parts to the
//! conveyor's `next`. A [`Factory`](engine::Factory) owns the conveyors and
//! starts them leaf-first, stops them root-first.

pub mod backends;   // worker implementations
pub mod config;     // config + worker registry
pub mod engine;     // conveyors, graph, factory
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // worker contract
