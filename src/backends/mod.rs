// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker implementations for The Conveyor.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process workers over `String` parts:
//! - **Text Transformation**: case conversion, reversal, prefix/suffix adding.
//!   Each transforms the part and forwards it to the line's `next`.
//! - **Collection**: a sink that keeps every part it receives, readable
//!   through a shared [`Collected`](local::Collected) handle
//! - **Use Case**: demo pipelines, configuration-driven tests
//!
//! ## Stub Backend (Test-Only)
//! Workers for exercising the engine itself (only available in test builds):
//! recording, slow, `Done`-dropping and forwarding workers.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use the_conveyor::backends::local::LocalWorkerFactory;
//!
//! let (registry, collected) = LocalWorkerFactory::registry(Duration::from_millis(500));
//! assert!(registry.contains("reverse_text"));
//! assert!(collected.is_empty());
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
