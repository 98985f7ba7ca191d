// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod change_text_case;
pub mod collector;
pub mod prefix_suffix_adder;
pub mod reverse_text;

pub use change_text_case::*;
pub use collector::*;
pub use prefix_suffix_adder::*;
pub use reverse_text::*;

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

use crate::engine::Conveyor;
use crate::observability::messages::worker::{ForwardRejected, PartProcessed, PartReceived};
use crate::observability::messages::StructuredLog;
use crate::traits::Done;

/// Transform a text part, forward the result and signal `done`.
///
/// A refused forward is logged and the part dropped. At a terminal line the
/// result is dropped too; terminate pipelines with a `collector` to keep it.
pub(crate) async fn transform_and_forward(
    worker: &str,
    part: String,
    done: Done,
    next: Option<Arc<Conveyor<String>>>,
    forward_timeout: Duration,
    transform: impl FnOnce(&str) -> String,
) {
    let received = PartReceived {
        worker,
        input_size: part.len(),
    };
    let span = received.span("part_processing");

    async move {
        received.log();
        let started = Instant::now();
        let output = transform(&part);

        PartProcessed {
            worker,
            input_size: part.len(),
            output_size: output.len(),
            duration: started.elapsed(),
        }
        .log();

        if let Some(next) = next {
            if let Err(rejected) = next.put_part(output, forward_timeout).await {
                ForwardRejected {
                    worker,
                    error: rejected.error(),
                }
                .log();
            }
        }

        done.done();
    }
    .instrument(span)
    .await
}
