//! Computation Graph
//!
//! This module holds the static side of the engine: nodes, the graph that
//! owns them, and the scheduler that orders them.
//!
//! # Overview
//!
//! A graph is a directed acyclic graph (DAG) where:
//!
//! - Nodes are computation steps with named inputs and one named output
//! - Edges are derived from names: if node B lists A's output among its
//!   inputs, there is an edge from A to B
//! - Inputs that no node produces are raw inputs, supplied by the caller
//!
//! Everything derived from the node list (output owners, edges, raw inputs,
//! execution order) is computed once when the graph is built.

mod dag;
mod description;
mod node;
mod scheduler;

pub use dag::Graph;
pub use description::{GraphDescription, NodeDescription};
pub use node::{InputNames, Node, NodeFn, Wrapper};
