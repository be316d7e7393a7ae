//! Computation Graph
//!
//! [`Graph`] owns a set of nodes and everything derived from them at
//! construction: which node produces each output, the producer/consumer
//! edges, the raw inputs, and the execution order. All of it is read-only
//! once built, so a graph can be evaluated any number of times.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use super::description::{GraphDescription, NodeDescription};
use super::node::{Node, NodeFn, Wrapper};
use super::scheduler::Scheduler;
use crate::error::{ConfigurationError, CyclicGraphError, Result};

/// A validated computation graph.
///
/// # Example
///
/// ```rust
/// use tinydag_core::{Graph, Node};
///
/// let graph = Graph::new([
///     Node::binary(["add1", "x"], "add2", |a: &f64, b: &f64| a + b)?,
///     Node::binary(["x", "y"], "add1", |a: &f64, b: &f64| a + b)?,
/// ])?;
///
/// let outputs = graph.evaluate([("x", 5.0), ("y", 3.0)])?;
/// assert_eq!(outputs["add1"], 8.0);
/// assert_eq!(outputs["add2"], 13.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Graph<V> {
    /// Nodes as declared.
    pub(crate) nodes: Vec<Node<V>>,

    /// Node functions with all wrappers applied, indexed like `nodes`.
    pub(crate) functions: Vec<NodeFn<V>>,

    /// Output name -> index of the producing node, in declaration order.
    pub(crate) output_owner: IndexMap<String, usize>,

    /// Producer/consumer edges.
    pub(crate) scheduler: Scheduler,

    /// Node indices in the order they run.
    pub(crate) execution_order: Vec<usize>,

    /// Inputs no node produces, in first-use order.
    raw_inputs: IndexSet<String>,

    wrappers: Vec<Wrapper<V>>,
}

impl<V> Graph<V> {
    /// Build a graph from nodes.
    ///
    /// Fails with a configuration error if two nodes share an output or a
    /// name, and with a cycle error if the nodes depend on each other
    /// circularly.
    pub fn new<I>(nodes: I) -> Result<Self>
    where
        I: IntoIterator<Item = Node<V>>,
    {
        Self::with_wrappers(nodes, Vec::new())
    }

    /// Build a graph whose node functions are each passed through `wrappers`.
    ///
    /// Wrappers apply in order, so the first one ends up innermost.
    pub fn with_wrappers<I, W>(nodes: I, wrappers: W) -> Result<Self>
    where
        I: IntoIterator<Item = Node<V>>,
        W: IntoIterator<Item = Wrapper<V>>,
    {
        let nodes: Vec<Node<V>> = nodes.into_iter().collect();
        let wrappers: Vec<Wrapper<V>> = wrappers.into_iter().collect();

        let mut output_owner: IndexMap<String, usize> = IndexMap::with_capacity(nodes.len());
        let mut names: HashSet<&str> = HashSet::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if let Some(&first) = output_owner.get(node.output()) {
                return Err(ConfigurationError::DuplicateOutput {
                    output: node.output().to_string(),
                    first: nodes[first].name().to_string(),
                    second: node.name().to_string(),
                }
                .into());
            }
            if !names.insert(node.name()) {
                return Err(ConfigurationError::DuplicateName {
                    name: node.name().to_string(),
                }
                .into());
            }
            output_owner.insert(node.output().to_string(), index);
        }

        let mut scheduler = Scheduler::with_nodes(nodes.len());
        let mut raw_inputs = IndexSet::new();
        for (index, node) in nodes.iter().enumerate() {
            for input in node.inputs() {
                match output_owner.get(input.as_str()) {
                    Some(&producer) => scheduler.add_edge(producer, index),
                    None => {
                        raw_inputs.insert(input.clone());
                    }
                }
            }
        }

        let execution_order = scheduler.topological_order().map_err(|cycle| CyclicGraphError {
            cycle: cycle
                .into_iter()
                .map(|index| nodes[index].name().to_string())
                .collect(),
        })?;

        let functions = nodes
            .iter()
            .map(|node| {
                wrappers
                    .iter()
                    .fold(Arc::clone(node.function()), |function, wrapper| {
                        wrapper(node.name(), function)
                    })
            })
            .collect();

        tracing::debug!(
            nodes = nodes.len(),
            raw_inputs = ?raw_inputs,
            wrappers = wrappers.len(),
            "graph built"
        );

        Ok(Self {
            nodes,
            functions,
            output_owner,
            scheduler,
            execution_order,
            raw_inputs,
            wrappers,
        })
    }

    /// Build a new graph from this graph's nodes followed by `nodes`.
    ///
    /// The new graph keeps this graph's wrappers and is fully re-validated.
    /// `self` is left untouched.
    pub fn extend<I>(&self, nodes: I) -> Result<Self>
    where
        I: IntoIterator<Item = Node<V>>,
    {
        Self::with_wrappers(
            self.nodes.iter().cloned().chain(nodes),
            self.wrappers.iter().cloned(),
        )
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get all nodes, in declaration order.
    pub fn nodes(&self) -> &[Node<V>] {
        &self.nodes
    }

    /// Get the node producing `output`.
    pub fn output_owner(&self, output: &str) -> Option<&Node<V>> {
        self.output_owner.get(output).map(|&index| &self.nodes[index])
    }

    /// Get a node by its display name.
    pub fn node_by_name(&self, name: &str) -> Option<&Node<V>> {
        self.nodes.iter().find(|node| node.name() == name)
    }

    /// Nodes whose outputs feed the node producing `output`.
    pub fn producers(&self, output: &str) -> impl Iterator<Item = &Node<V>> + '_ {
        self.neighbors(output, Scheduler::dependencies)
    }

    /// Nodes that consume `output`.
    pub fn consumers(&self, output: &str) -> impl Iterator<Item = &Node<V>> + '_ {
        self.neighbors(output, Scheduler::dependents)
    }

    fn neighbors<'a>(
        &'a self,
        output: &str,
        edges: fn(&Scheduler, usize) -> &[usize],
    ) -> impl Iterator<Item = &'a Node<V>> + 'a {
        let adjacent: &[usize] = match self.output_owner.get(output) {
            Some(&index) => edges(&self.scheduler, index),
            None => &[],
        };
        adjacent.iter().map(move |&index| &self.nodes[index])
    }

    /// Nodes in the order they run.
    pub fn execution_order(&self) -> impl ExactSizeIterator<Item = &Node<V>> + '_ {
        self.execution_order.iter().map(move |&index| &self.nodes[index])
    }

    /// Names the caller must supply when evaluating: inputs no node produces.
    pub fn raw_inputs(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.raw_inputs.iter().map(String::as_str)
    }

    /// Check if `name` is a raw input of this graph.
    pub fn is_raw_input(&self, name: &str) -> bool {
        self.raw_inputs.contains(name)
    }

    /// All output names, in declaration order.
    pub fn outputs(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.output_owner.keys().map(String::as_str)
    }

    /// Take a serializable snapshot of the graph structure.
    pub fn describe(&self) -> GraphDescription {
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| NodeDescription {
                name: node.name().to_string(),
                inputs: node.inputs().to_vec(),
                output: node.output().to_string(),
                upstream: self
                    .scheduler
                    .dependencies(index)
                    .iter()
                    .map(|&producer| self.nodes[producer].name().to_string())
                    .collect(),
            })
            .collect();

        GraphDescription {
            nodes,
            raw_inputs: self.raw_inputs.iter().cloned().collect(),
            execution_order: self
                .execution_order()
                .map(|node| node.name().to_string())
                .collect(),
        }
    }
}

impl<V> Clone for Graph<V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            functions: self.functions.clone(),
            output_owner: self.output_owner.clone(),
            scheduler: self.scheduler.clone(),
            execution_order: self.execution_order.clone(),
            raw_inputs: self.raw_inputs.clone(),
            wrappers: self.wrappers.clone(),
        }
    }
}

impl<V> fmt::Debug for Graph<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes)
            .field(
                "execution_order",
                &self.execution_order().map(Node::name).collect::<Vec<_>>(),
            )
            .field("raw_inputs", &self.raw_inputs)
            .finish_non_exhaustive()
    }
}
