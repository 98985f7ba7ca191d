// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::backends::local::workers::{ChangeTextCaseWorker, CollectorWorker, ReverseTextWorker};
use crate::backends::stub::{ForwardingWorker, RecordingWorker, SlowWorker};
use crate::engine::{Conveyor, Factory, Status};
use crate::traits::{Done, FnWorker, Worker};

/// Integration tests for multi-stage pipelines driven through a Factory
#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(500);

    #[tokio::test]
    async fn test_change_text_case_to_reverse_text_pipeline() {
        let collector = CollectorWorker::new();
        let collected = collector.collected();

        let sink = Conveyor::builder("sink", Arc::new(collector) as Arc<dyn Worker<String>>)
            .build()
            .unwrap();
        let reverse = Conveyor::builder(
            "reverse",
            Arc::new(ReverseTextWorker::new()) as Arc<dyn Worker<String>>,
        )
        .next(Arc::clone(&sink))
        .build()
        .unwrap();
        let uppercase = Conveyor::builder(
            "uppercase",
            Arc::new(ChangeTextCaseWorker::upper()) as Arc<dyn Worker<String>>,
        )
        .next(Arc::clone(&reverse))
        .build()
        .unwrap();

        let factory = Factory::new();
        factory.add_line("uppercase", uppercase).unwrap();
        factory.add_line("reverse", reverse).unwrap();
        factory.add_line("sink", sink).unwrap();
        factory.run().await.unwrap();

        factory
            .line("uppercase")
            .unwrap()
            .put_part("hello world".to_string(), TIMEOUT)
            .await
            .unwrap();
        factory.stop().await;

        assert_eq!(collected.parts(), vec!["DLROW OLLEH"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_stage_pipeline_delivers_each_part_exactly_once() {
        let recorder = RecordingWorker::<u32>::new();
        let b = Conveyor::builder("b", Arc::new(recorder.clone()) as Arc<dyn Worker<u32>>)
            .capacity(4)
            .workers(1, 1)
            .build()
            .unwrap();
        let a = Conveyor::builder(
            "a",
            Arc::new(ForwardingWorker::new(TIMEOUT)) as Arc<dyn Worker<u32>>,
        )
        .capacity(4)
        .workers(1, 1)
        .next(Arc::clone(&b))
        .build()
        .unwrap();

        let factory = Factory::new();
        factory.add_line("a", Arc::clone(&a)).unwrap();
        factory.add_line("b", Arc::clone(&b)).unwrap();
        factory.run().await.unwrap();

        for part in 0..5 {
            a.put_part(part, TIMEOUT).await.unwrap();
        }
        factory.stop().await;

        let mut seen = recorder.parts();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(a.stats().completed, 5);
        assert_eq!(b.stats().admitted, 5);
    }

    #[tokio::test]
    async fn test_factory_starts_leaves_first_and_stops_roots_first() {
        let c = Conveyor::builder("c", Arc::new(RecordingWorker::<u32>::new()) as Arc<dyn Worker<u32>>)
            .build()
            .unwrap();
        let b = Conveyor::builder("b", Arc::new(ForwardingWorker::new(TIMEOUT)) as Arc<dyn Worker<u32>>)
            .next(Arc::clone(&c))
            .build()
            .unwrap();
        let a = Conveyor::builder("a", Arc::new(ForwardingWorker::new(TIMEOUT)) as Arc<dyn Worker<u32>>)
            .next(Arc::clone(&b))
            .build()
            .unwrap();

        let factory = Factory::new();
        // Registration order is irrelevant to lifecycle order.
        factory.add_line("a", Arc::clone(&a)).unwrap();
        factory.add_line("b", Arc::clone(&b)).unwrap();
        factory.add_line("c", Arc::clone(&c)).unwrap();

        assert_eq!(factory.roots(), vec!["a"]);
        assert_eq!(factory.leaves(), vec!["c"]);

        factory.run().await.unwrap();
        let started = |conveyor: &Arc<Conveyor<u32>>| conveyor.started_at().unwrap();
        assert!(started(&c) <= started(&b));
        assert!(started(&b) <= started(&a));

        factory.stop().await;
        let stopped = |conveyor: &Arc<Conveyor<u32>>| conveyor.stopped_at().unwrap();
        assert!(stopped(&a) <= stopped(&b));
        assert!(stopped(&b) <= stopped(&c));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_factory_stop_waits_for_every_line_and_is_idempotent() {
        let slow = SlowWorker::new(Duration::from_millis(10));
        let store = Conveyor::builder("store", Arc::new(slow.clone()) as Arc<dyn Worker<u32>>)
            .capacity(16)
            .build()
            .unwrap();
        let ingest = Conveyor::builder(
            "ingest",
            Arc::new(ForwardingWorker::new(TIMEOUT)) as Arc<dyn Worker<u32>>,
        )
        .capacity(16)
        .next(Arc::clone(&store))
        .build()
        .unwrap();

        let factory = Arc::new(Factory::new());
        factory.add_line("ingest", Arc::clone(&ingest)).unwrap();
        factory.add_line("store", Arc::clone(&store)).unwrap();
        factory.run().await.unwrap();

        for part in 0..8 {
            ingest.put_part(part, TIMEOUT).await.unwrap();
        }

        let racing = tokio::spawn({
            let factory = Arc::clone(&factory);
            async move { factory.stop().await }
        });
        factory.stop().await;
        racing.await.unwrap();

        assert_eq!(factory.status(), Status::Stopped);
        for line in [&ingest, &store] {
            assert_eq!(line.status().await, Status::Stopped);
            assert!(line.is_drained());
        }
        assert_eq!(slow.handled(), 8);

        factory.stop().await;
        let rejected = ingest.put_part(99, TIMEOUT).await.unwrap_err();
        assert!(rejected.error().is_stopped());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_enum_parts_dispatch_by_variant() {
        #[derive(Debug, Clone, PartialEq)]
        enum Part {
            Order { id: u32 },
            Refund { id: u32, amount: u64 },
        }

        let seen: Arc<std::sync::Mutex<BTreeMap<&'static str, Vec<u32>>>> = Default::default();
        let worker = {
            let seen = Arc::clone(&seen);
            FnWorker::named(
                "ledger",
                move |part: Part, done: Done, _next: Option<Arc<Conveyor<Part>>>| {
                    let seen = Arc::clone(&seen);
                    async move {
                        let (kind, id) = match part {
                            Part::Order { id } => ("order", id),
                            Part::Refund { id, amount } if amount > 0 => ("refund", id),
                            Part::Refund { id, .. } => ("ignored", id),
                        };
                        seen.lock().unwrap().entry(kind).or_default().push(id);
                        done.done();
                    }
                },
            )
        };

        let ledger = Conveyor::builder("ledger", Arc::new(worker) as Arc<dyn Worker<Part>>)
            .build()
            .unwrap();
        let factory = Factory::new();
        factory.add_line("ledger", Arc::clone(&ledger)).unwrap();
        factory.run().await.unwrap();

        for part in [
            Part::Order { id: 1 },
            Part::Refund { id: 2, amount: 10 },
            Part::Refund { id: 3, amount: 0 },
        ] {
            ledger.put_part(part, TIMEOUT).await.unwrap();
        }
        factory.stop().await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.get("order"), Some(&vec![1]));
        assert_eq!(seen.get("refund"), Some(&vec![2]));
        assert_eq!(seen.get("ignored"), Some(&vec![3]));
    }

    #[tokio::test]
    async fn test_forward_into_stopped_line_is_seen_by_the_worker() {
        let downstream = Conveyor::builder(
            "downstream",
            Arc::new(RecordingWorker::<u32>::new()) as Arc<dyn Worker<u32>>,
        )
        .build()
        .unwrap();
        let forwarder = ForwardingWorker::new(Duration::from_millis(20));
        let upstream = Conveyor::builder("upstream", Arc::new(forwarder.clone()) as Arc<dyn Worker<u32>>)
            .next(Arc::clone(&downstream))
            .build()
            .unwrap();

        // Driven by hand: the downstream line stops before its producer.
        downstream.run().await;
        downstream.stop().await;
        upstream.run().await;
        upstream.put_part(1, TIMEOUT).await.unwrap();
        upstream.stop().await;

        assert_eq!(forwarder.rejected(), 1);
        assert_eq!(upstream.stats().completed, 1);
    }
}
