//! Graph Evaluation
//!
//! Runs a built graph against caller-supplied raw inputs.
//!
//! # How Evaluation Works
//!
//! 1. A fresh [`DataStore`] is seeded with the raw inputs.
//! 2. The plan is the graph's execution order, narrowed to the requested
//!    targets and their transitive producers when targets are given.
//! 3. Each planned node has its inputs resolved from the store, its function
//!    called, and its result stored under its output name.
//! 4. The requested outputs are moved out of the store and returned.
//!
//! The first missing input or failing node aborts the evaluation. Nothing
//! computed up to that point is returned.

use std::collections::HashSet;
use std::time::Instant;

use indexmap::IndexMap;

use super::store::DataStore;
use crate::error::{GraphError, MissingInputError, NodeExecutionError, Result};
use crate::graph::Graph;

/// Computed values keyed by output name, in execution order.
pub type Outputs<V> = IndexMap<String, V>;

impl<V> Graph<V> {
    /// Verify that `supplied` covers every raw input, without running any node.
    ///
    /// Returns the same [`MissingInputError`] a call to
    /// [`Graph::evaluate`] with those names would fail with first.
    pub fn check<I, S>(&self, supplied: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let supplied: HashSet<String> = supplied
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();

        for node in self.execution_order() {
            let missing = node.inputs().iter().find(|input| {
                !self.output_owner.contains_key(input.as_str()) && !supplied.contains(input.as_str())
            });
            if let Some(input) = missing {
                return Err(MissingInputError {
                    input: input.clone(),
                    node: node.name().to_string(),
                }
                .into());
            }
        }

        Ok(())
    }
}

impl<V: Clone> Graph<V> {
    /// Run every node and return every output.
    ///
    /// `raw` supplies the raw inputs as `(name, value)` pairs. Names no node
    /// reads are ignored.
    pub fn evaluate<I, K>(&self, raw: I) -> Result<Outputs<V>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let mut store = DataStore::from_raw(raw);
        self.run(&mut store, &self.execution_order)?;

        Ok(self.take_outputs(&mut store, self.execution_order.iter().copied()))
    }

    /// Run only what `targets` need and return exactly those outputs.
    ///
    /// Nodes that none of the targets depend on are not executed. Fails with
    /// [`GraphError::UnknownTarget`] before running anything if a target is
    /// not the output of some node.
    pub fn evaluate_targets<I, K, T, S>(&self, raw: I, targets: T) -> Result<Outputs<V>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut wanted = vec![false; self.len()];
        for target in targets {
            let target = target.as_ref();
            match self.output_owner.get(target) {
                Some(&index) => wanted[index] = true,
                None => return Err(GraphError::UnknownTarget(target.to_string())),
            }
        }

        let needed = self
            .scheduler
            .upstream_of((0..self.len()).filter(|&index| wanted[index]));
        let plan: Vec<usize> = self
            .execution_order
            .iter()
            .copied()
            .filter(|&index| needed[index])
            .collect();

        let mut store = DataStore::from_raw(raw);
        self.run(&mut store, &plan)?;

        Ok(self.take_outputs(&mut store, plan.into_iter().filter(|&index| wanted[index])))
    }

    fn run(&self, store: &mut DataStore<V>, plan: &[usize]) -> Result<()> {
        let started = Instant::now();
        tracing::debug!(
            nodes = plan.len(),
            skipped = self.len() - plan.len(),
            supplied = store.len(),
            "evaluation started"
        );

        for &index in plan {
            let node = &self.nodes[index];
            let args = store.resolve(node)?;
            tracing::trace!(node = node.name(), inputs = ?node.inputs(), "inputs resolved");

            let node_started = Instant::now();
            let value = (self.functions[index])(args.as_slice()).map_err(|source| NodeExecutionError {
                node: node.name().to_string(),
                source,
            })?;
            tracing::debug!(
                node = node.name(),
                elapsed_us = node_started.elapsed().as_micros() as u64,
                "node executed"
            );

            store.insert(node.output(), value);
        }

        tracing::debug!(
            elapsed_us = started.elapsed().as_micros() as u64,
            "evaluation finished"
        );
        Ok(())
    }

    /// Move the outputs of `indices` out of the store.
    fn take_outputs(
        &self,
        store: &mut DataStore<V>,
        indices: impl Iterator<Item = usize>,
    ) -> Outputs<V> {
        indices
            .filter_map(|index| {
                let output = self.nodes[index].output();
                store
                    .take(output)
                    .map(|value| (output.to_string(), value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, NodeFn, Wrapper};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn add(inputs: [&str; 2], output: &str) -> Node<i64> {
        Node::binary(inputs, output, |a: &i64, b: &i64| a + b).unwrap()
    }

    fn counted(inputs: [&str; 2], output: &str, calls: &Arc<AtomicUsize>) -> Node<i64> {
        let calls = Arc::clone(calls);
        Node::binary(inputs, output, move |a: &i64, b: &i64| {
            calls.fetch_add(1, Ordering::SeqCst);
            a + b
        })
        .unwrap()
    }

    #[test]
    fn each_node_runs_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let graph = Graph::new([
            counted(["x", "y"], "a", &calls),
            counted(["a", "x"], "b", &calls),
            counted(["a", "b"], "c", &calls),
        ])
        .unwrap();

        let outputs = graph.evaluate([("x", 1), ("y", 2)]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(outputs["c"], 3 + 4);
    }

    #[test]
    fn outputs_follow_execution_order_and_skip_raw_inputs() {
        let graph = Graph::new([add(["a", "z"], "b"), add(["x", "y"], "a")]).unwrap();
        let outputs = graph.evaluate([("x", 1), ("y", 2), ("z", 3), ("w", 9)]).unwrap();

        assert_eq!(outputs.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(outputs["b"], 6);
    }

    #[test]
    fn node_output_overrides_raw_value_of_same_name() {
        let graph = Graph::new([add(["x", "y"], "sum")]).unwrap();
        let outputs = graph.evaluate([("x", 1), ("y", 2), ("sum", 100)]).unwrap();
        assert_eq!(outputs["sum"], 3);
        assert_eq!(outputs.len(), 1);
    }

    #[test]
    fn targets_skip_unrelated_nodes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let graph = Graph::new([
            counted(["x", "y"], "a", &calls),
            counted(["a", "x"], "b", &calls),
            counted(["x", "x"], "c", &calls),
        ])
        .unwrap();

        let outputs = graph.evaluate_targets([("x", 1), ("y", 2)], ["b"]).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs["b"], 4);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn targets_do_not_need_downstream_raw_inputs() {
        let graph = Graph::new([add(["x", "y"], "a"), add(["a", "z"], "b")]).unwrap();
        let outputs = graph.evaluate_targets([("x", 1), ("y", 2)], ["a"]).unwrap();
        assert_eq!(outputs.into_iter().collect::<Vec<_>>(), [("a".to_string(), 3)]);
    }

    #[test]
    fn unknown_target_is_rejected() {
        let graph = Graph::new([add(["x", "y"], "a")]).unwrap();
        let err = graph.evaluate_targets([("x", 1), ("y", 2)], ["x"]).unwrap_err();
        assert!(matches!(err, GraphError::UnknownTarget(ref name) if name == "x"));
    }

    #[test]
    fn missing_input_names_input_and_node() {
        let graph = Graph::new([add(["x", "y"], "a"), add(["a", "z"], "b")]).unwrap();
        let err = graph.evaluate([("x", 1), ("y", 2)]).unwrap_err();
        assert_eq!(
            err.as_missing_input(),
            Some(&MissingInputError {
                input: "z".into(),
                node: "b".into(),
            })
        );
    }

    #[test]
    fn failing_node_aborts_evaluation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let failing = Node::new(["x"], "fails", |_: &[i64]| Err("boom".into())).unwrap();
        let graph = Graph::new([
            failing,
            counted(["fails", "x"], "after", &calls),
        ])
        .unwrap();

        let err = graph.evaluate([("x", 1)]).unwrap_err();
        let exec = err.as_node_execution().unwrap();
        assert_eq!(exec.node, "fails");
        assert_eq!(exec.source.to_string(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn check_matches_first_evaluation_failure() {
        let graph = Graph::new([add(["x", "y"], "a"), add(["x", "z"], "b")]).unwrap();

        assert!(graph.check(["x", "y", "z"]).is_ok());

        let checked = graph.check(["x", "y"]).unwrap_err();
        let evaluated = graph.evaluate([("x", 1), ("y", 2)]).unwrap_err();
        assert_eq!(checked.as_missing_input(), evaluated.as_missing_input());
        assert_eq!(checked.as_missing_input().unwrap().input, "z");
    }

    #[test]
    fn check_does_not_run_nodes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let graph = Graph::new([counted(["x", "y"], "a", &calls)]).unwrap();
        graph.check(["x", "y"]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn wrappers_apply_in_order() {
        let plus_one: Wrapper<i64> = Arc::new(|_: &str, inner: NodeFn<i64>| -> NodeFn<i64> {
            Arc::new(move |args: &[i64]| inner(args).map(|v| v + 1))
        });
        let double: Wrapper<i64> = Arc::new(|_: &str, inner: NodeFn<i64>| -> NodeFn<i64> {
            Arc::new(move |args: &[i64]| inner(args).map(|v| v * 2))
        });

        let graph = Graph::with_wrappers([add(["x", "y"], "a")], [plus_one, double]).unwrap();
        let outputs = graph.evaluate([("x", 1), ("y", 2)]).unwrap();
        assert_eq!(outputs["a"], (3 + 1) * 2);

        let extended = graph.extend([add(["a", "x"], "b")]).unwrap();
        let outputs = extended.evaluate([("x", 1), ("y", 2)]).unwrap();
        assert_eq!(outputs["b"], (8 + 1 + 1) * 2);
    }

    #[test]
    fn wrapper_sees_node_name() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let record: Wrapper<i64> = Arc::new(move |name: &str, inner: NodeFn<i64>| {
            recorder.lock().unwrap().push(name.to_string());
            inner
        });

        Graph::with_wrappers(
            [add(["x", "y"], "a").with_name("first").unwrap(), add(["a", "y"], "b")],
            [record],
        )
        .unwrap();
        assert_eq!(*seen.lock().unwrap(), ["first", "b"]);
    }
}
