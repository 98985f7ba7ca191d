// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic and operational logging in the engine goes through message
//! types defined here. Each message is a small struct with a `Display`
//! implementation, so log text lives in one place instead of being scattered
//! through the conveyor and factory code.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::conveyor` - conveyor lifecycle, admission and pool scaling
//! * `messages::factory` - factory registration and coordinated lifecycle
//! * `messages::validation` - pipeline layout validation failures
//!
//! # Usage
//!
//! ```rust
//! use the_conveyor::observability::messages::{conveyor::ConveyorStarted, StructuredLog};
//!
//! let msg = ConveyorStarted {
//!     line: "ingest",
//!     capacity: 64,
//!     min_workers: 1,
//!     max_workers: 4,
//!     scale_interval: None,
//! };
//!
//! msg.log();
//! ```

pub mod messages;
