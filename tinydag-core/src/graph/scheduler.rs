//! Execution Scheduler
//!
//! The scheduler holds the producer/consumer edges between nodes and decides
//! the order in which nodes run. Nodes are addressed by their declaration
//! index.
//!
//! # Algorithm
//!
//! 1. Cycle detection walks each node's producers depth-first with a
//!    three-color marking (unvisited, in progress, done). Reaching a node that
//!    is still in progress means the current DFS path closes a cycle, and the
//!    path itself is the cycle.
//! 2. Ordering uses Kahn's algorithm. The ready set is kept sorted by
//!    declaration index, so among nodes whose producers have all run, the one
//!    declared first always goes next. Identical node lists therefore always
//!    produce identical orders.

use std::collections::BTreeSet;

use smallvec::SmallVec;

/// Neighbor indices of one node.
pub(crate) type Adjacency = SmallVec<[usize; 4]>;

/// Producer/consumer edges between nodes, indexed by declaration order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scheduler {
    /// For each node, the nodes producing its inputs (first-use order).
    dependencies: Vec<Adjacency>,

    /// For each node, the nodes consuming its output (declaration order).
    dependents: Vec<Adjacency>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl Scheduler {
    /// Create a scheduler for `count` nodes with no edges.
    pub fn with_nodes(count: usize) -> Self {
        Self {
            dependencies: vec![Adjacency::new(); count],
            dependents: vec![Adjacency::new(); count],
        }
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.dependencies.len()
    }

    /// Add an edge: `consumer` reads the output of `producer`.
    ///
    /// Repeated edges between the same pair are stored once.
    pub fn add_edge(&mut self, producer: usize, consumer: usize) {
        if !self.dependencies[consumer].contains(&producer) {
            self.dependencies[consumer].push(producer);
            self.dependents[producer].push(consumer);
        }
    }

    /// Nodes whose outputs `node` consumes.
    pub fn dependencies(&self, node: usize) -> &[usize] {
        &self.dependencies[node]
    }

    /// Nodes that consume the output of `node`.
    pub fn dependents(&self, node: usize) -> &[usize] {
        &self.dependents[node]
    }

    /// Find a cycle, if any.
    ///
    /// The cycle is returned in data-flow order with its first node repeated
    /// at the end: `[a, b, a]` means `a` feeds `b` and `b` feeds `a`.
    pub fn find_cycle(&self) -> Option<Vec<usize>> {
        let mut marks = vec![Mark::Unvisited; self.node_count()];

        for root in 0..self.node_count() {
            if marks[root] != Mark::Unvisited {
                continue;
            }

            // Each frame is (node, index of the next producer to visit).
            // The frames on the stack form the current DFS path.
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            marks[root] = Mark::InProgress;

            while let Some(frame) = stack.last_mut() {
                let (node, next) = *frame;
                let Some(&producer) = self.dependencies[node].get(next) else {
                    marks[node] = Mark::Done;
                    stack.pop();
                    continue;
                };
                frame.1 += 1;

                match marks[producer] {
                    Mark::Done => {}
                    Mark::Unvisited => {
                        marks[producer] = Mark::InProgress;
                        stack.push((producer, 0));
                    }
                    Mark::InProgress => {
                        // The path walks from consumers to producers, so the
                        // frames after `producer` are reversed to get data flow.
                        let start = stack
                            .iter()
                            .position(|&(n, _)| n == producer)
                            .unwrap_or(0);
                        let mut cycle = Vec::with_capacity(stack.len() - start + 1);
                        cycle.push(producer);
                        cycle.extend(stack[start + 1..].iter().rev().map(|&(n, _)| n));
                        cycle.push(producer);
                        return Some(cycle);
                    }
                }
            }
        }

        None
    }

    /// Compute the execution order.
    ///
    /// Returns the cycle (as from [`Scheduler::find_cycle`]) if no order
    /// exists.
    pub fn topological_order(&self) -> Result<Vec<usize>, Vec<usize>> {
        if let Some(cycle) = self.find_cycle() {
            return Err(cycle);
        }

        let count = self.node_count();
        let mut in_degree: Vec<usize> = self.dependencies.iter().map(|deps| deps.len()).collect();
        let mut ready: BTreeSet<usize> = (0..count).filter(|&n| in_degree[n] == 0).collect();
        let mut order = Vec::with_capacity(count);

        // Kahn's algorithm, always taking the earliest-declared ready node
        while let Some(node) = ready.pop_first() {
            order.push(node);

            for &dependent in &self.dependents[node] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        debug_assert_eq!(order.len(), count, "acyclic graph must order every node");
        Ok(order)
    }

    /// Mark `targets` and every node they transitively depend on.
    ///
    /// The returned vector is indexed by node.
    pub fn upstream_of(&self, targets: impl IntoIterator<Item = usize>) -> Vec<bool> {
        let mut needed = vec![false; self.node_count()];
        let mut pending: Vec<usize> = targets.into_iter().collect();

        while let Some(node) = pending.pop() {
            if needed[node] {
                continue;
            }
            needed[node] = true;
            pending.extend(self.dependencies[node].iter().copied());
        }

        needed
    }
}
