// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dependency bookkeeping over conveyors linked by `next`.
//!
//! The graph exists only to order lifecycle transitions:
//!
//! - **Leaves** have no `next`. They start first, then each producer that feeds
//!   them, walking upward, so a stage is always running before anything can
//!   forward into it.
//! - **Roots** have no producers. They stop first, and a stop cascades down to a
//!   child only once every parent of that child has drained, so nothing
//!   upstream is still producing when a stage is told to stop.
//!
//! ```text
//!   ingest ──┐
//!            ├──> normalize ──> store
//!   replay ──┘
//!
//!   start: store, normalize, ingest, replay
//!   stop:  {ingest, replay} concurrently, then normalize, then store
//! ```
//!
//! Vertices live in an arena and link by index. Identity is the conveyor
//! allocation (`Arc::ptr_eq`), so adding the same conveyor twice merges links
//! instead of creating a second vertex.

use std::sync::Arc;
use tokio::task::JoinSet;

use crate::engine::Conveyor;
use crate::errors::ValidationError;

struct Node<P>
where
    P: Send + 'static,
{
    conveyor: Arc<Conveyor<P>>,
    parents: Vec<usize>,
    child: Option<usize>,
}

/// Conveyors and their `next` links, indexed for start/stop ordering.
pub struct Graph<P>
where
    P: Send + 'static,
{
    nodes: Vec<Node<P>>,
}

impl<P> Default for Graph<P>
where
    P: Send + 'static,
{
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<P> Graph<P>
where
    P: Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from conveyors in any order.
    pub fn from_conveyors<'a>(conveyors: impl IntoIterator<Item = &'a Arc<Conveyor<P>>>) -> Self {
        let mut graph = Self::new();
        for conveyor in conveyors {
            graph.add_node(conveyor);
        }
        graph
    }

    /// Add `conveyor` and its `next` link, merging with existing vertices.
    ///
    /// A conveyor already present keeps its vertex: the parent link is appended
    /// to the child (once) and the child link is overwritten. The `next` chain
    /// is added along with it.
    pub fn add_node(&mut self, conveyor: &Arc<Conveyor<P>>) -> usize {
        let index = self.vertex(conveyor);
        if let Some(next) = conveyor.next() {
            let child = self.add_node(next);
            if let Some(previous) = self.nodes[index].child.replace(child) {
                self.nodes[previous].parents.retain(|&parent| parent != index);
            }
            if !self.nodes[child].parents.contains(&index) {
                self.nodes[child].parents.push(index);
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn conveyor(&self, index: usize) -> &Arc<Conveyor<P>> {
        &self.nodes[index].conveyor
    }

    pub fn conveyors(&self) -> impl Iterator<Item = &Arc<Conveyor<P>>> {
        self.nodes.iter().map(|node| &node.conveyor)
    }

    pub fn position(&self, conveyor: &Arc<Conveyor<P>>) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| Arc::ptr_eq(&node.conveyor, conveyor))
    }

    /// Vertices with no `next`.
    pub fn compute_leaves(&self) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&index| self.nodes[index].child.is_none())
            .collect()
    }

    /// Vertices with no producers, found by walking up from every leaf.
    ///
    /// The walk keeps no visited set, so a root reachable along several paths
    /// is listed once per path. Lifecycle transitions are idempotent, which
    /// makes the repeats harmless.
    pub fn compute_roots(&self) -> Vec<usize> {
        let mut roots = Vec::new();
        for leaf in self.compute_leaves() {
            let mut stack = vec![leaf];
            while let Some(index) = stack.pop() {
                let parents = &self.nodes[index].parents;
                if parents.is_empty() {
                    roots.push(index);
                } else {
                    stack.extend(parents.iter().rev());
                }
            }
        }
        roots
    }

    /// Cycles in the `next` chain. A cycle has no leaf, so it would never start.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> =
            find_cycles(self.nodes.len(), |index| self.nodes[index].child)
                .into_iter()
                .map(|cycle| ValidationError::CyclicPipeline {
                    cycle: cycle
                        .into_iter()
                        .map(|index| self.nodes[index].conveyor.name().to_string())
                        .collect(),
                })
                .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Start every leaf, then walk upward starting each producer.
    ///
    /// Each vertex starts only after its child's `run` has returned.
    pub async fn run_from_leaves(&self) {
        for leaf in self.compute_leaves() {
            let mut stack = vec![leaf];
            while let Some(index) = stack.pop() {
                let node = &self.nodes[index];
                node.conveyor.run().await;
                stack.extend(node.parents.iter().rev());
            }
        }
    }

    /// Stop every root concurrently, cascading down each `next` chain.
    ///
    /// Returns once every cascade has finished, i.e. once every vertex that
    /// was running has drained.
    pub async fn stop_from_roots(self: &Arc<Self>) {
        let mut cascades = JoinSet::new();
        for root in self.compute_roots() {
            let graph = Arc::clone(self);
            cascades.spawn(async move { graph.stop_cascade(root).await });
        }

        while let Some(joined) = cascades.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "stop cascade task failed");
            }
        }
    }

    async fn stop_cascade(&self, root: usize) {
        let mut cursor = Some(root);
        while let Some(index) = cursor {
            let node = &self.nodes[index];
            node.conveyor.stop().await;

            // The last producer to drain carries the stop downstream.
            cursor = node.child.filter(|&child| {
                self.nodes[child]
                    .parents
                    .iter()
                    .all(|&parent| self.nodes[parent].conveyor.is_drained())
            });
        }
    }

    fn vertex(&mut self, conveyor: &Arc<Conveyor<P>>) -> usize {
        match self.position(conveyor) {
            Some(index) => index,
            None => {
                self.nodes.push(Node {
                    conveyor: Arc::clone(conveyor),
                    parents: Vec::new(),
                    child: None,
                });
                self.nodes.len() - 1
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Every cycle in a single-successor graph, each as a vertex path with the
/// first vertex repeated at the end.
pub(crate) fn find_cycles(len: usize, next: impl Fn(usize) -> Option<usize>) -> Vec<Vec<usize>> {
    let mut marks = vec![Mark::Unvisited; len];
    let mut cycles = Vec::new();

    for start in 0..len {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        let mut path = Vec::new();
        let mut cursor = Some(start);
        while let Some(index) = cursor {
            match marks[index] {
                Mark::Unvisited => {
                    marks[index] = Mark::OnPath;
                    path.push(index);
                    cursor = next(index);
                }
                Mark::OnPath => {
                    let from = path.iter().position(|&p| p == index).unwrap_or(0);
                    let mut cycle = path[from..].to_vec();
                    cycle.push(index);
                    cycles.push(cycle);
                    break;
                }
                Mark::Done => break,
            }
        }

        for index in path {
            marks[index] = Mark::Done;
        }
    }

    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{ForwardingWorker, RecordingWorker, SlowWorker};
    use crate::traits::Worker;
    use std::time::Duration;

    fn stage(name: &str, next: Option<&Arc<Conveyor<u32>>>) -> Arc<Conveyor<u32>> {
        let worker = Arc::new(ForwardingWorker::new(Duration::from_millis(200))) as Arc<dyn Worker<u32>>;
        let builder = Conveyor::builder(name, worker).capacity(8);
        match next {
            Some(next) => builder.next(Arc::clone(next)).build().unwrap(),
            None => builder.build().unwrap(),
        }
    }

    fn names(graph: &Graph<u32>, indices: Vec<usize>) -> Vec<String> {
        indices
            .into_iter()
            .map(|index| graph.conveyor(index).name().to_string())
            .collect()
    }

    #[test]
    fn test_add_node_merges_by_identity() {
        let sink = stage("sink", None);
        let a = stage("a", Some(&sink));
        let b = stage("b", Some(&sink));

        let mut graph = Graph::new();
        graph.add_node(&a);
        graph.add_node(&sink);
        graph.add_node(&b);
        graph.add_node(&a);

        assert_eq!(graph.len(), 3);
        let sink_index = graph.position(&sink).unwrap();
        assert_eq!(graph.nodes[sink_index].parents.len(), 2);
    }

    #[test]
    fn test_roots_and_leaves_for_fan_in() {
        let store = stage("store", None);
        let normalize = stage("normalize", Some(&store));
        let ingest = stage("ingest", Some(&normalize));
        let replay = stage("replay", Some(&normalize));

        let graph = Graph::from_conveyors([&store, &normalize, &ingest, &replay]);

        assert_eq!(names(&graph, graph.compute_leaves()), vec!["store"]);
        let mut roots = names(&graph, graph.compute_roots());
        roots.sort();
        assert_eq!(roots, vec!["ingest", "replay"]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_find_cycles_reports_path_with_repeat() {
        // 0 -> 1 -> 2 -> 1, 3 -> 3, 4 -> none
        let next = [Some(1), Some(2), Some(1), Some(3), None];
        let cycles = find_cycles(next.len(), |i| next[i]);
        assert_eq!(cycles, vec![vec![1, 2, 1], vec![3, 3]]);
    }

    #[tokio::test]
    async fn test_run_from_leaves_starts_children_first() {
        let store = stage("store", None);
        let normalize = stage("normalize", Some(&store));
        let ingest = stage("ingest", Some(&normalize));

        let graph = Graph::from_conveyors([&ingest, &normalize, &store]);
        graph.run_from_leaves().await;

        let started = |c: &Arc<Conveyor<u32>>| c.started_at().unwrap();
        assert!(started(&store) <= started(&normalize));
        assert!(started(&normalize) <= started(&ingest));

        Arc::new(graph).stop_from_roots().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fan_in_child_stops_after_every_parent_drains() {
        let recorder = RecordingWorker::<u32>::new();
        let store = Conveyor::builder("store", Arc::new(recorder.clone()) as Arc<dyn Worker<u32>>)
            .capacity(32)
            .build()
            .unwrap();
        let fast = stage("fast", Some(&store));
        let slow = Conveyor::builder(
            "slow",
            Arc::new(SlowWorker::new(Duration::from_millis(10))) as Arc<dyn Worker<u32>>,
        )
        .next(Arc::clone(&store))
        .capacity(8)
        .build()
        .unwrap();

        let graph = Arc::new(Graph::from_conveyors([&store, &fast, &slow]));
        graph.run_from_leaves().await;

        for part in 0..5 {
            fast.put_part(part, Duration::from_millis(100)).await.unwrap();
            slow.put_part(part, Duration::from_millis(100)).await.unwrap();
        }

        graph.stop_from_roots().await;

        for conveyor in [&store, &fast, &slow] {
            assert!(conveyor.is_drained(), "{} should be drained", conveyor.name());
        }
        assert!(store.stopped_at().unwrap() >= slow.stopped_at().unwrap());
        assert!(store.stopped_at().unwrap() >= fast.stopped_at().unwrap());
        assert_eq!(recorder.len(), 5);
    }
}
