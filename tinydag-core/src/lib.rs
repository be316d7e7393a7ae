//! tinydag Core
//!
//! This crate provides the engine behind tinydag: computations described as
//! a directed acyclic graph of named nodes, validated once and evaluated any
//! number of times.
//!
//! - Each [`Node`] lists its input names, a function, and one output name
//! - A [`Graph`] links nodes by matching input names to output names,
//!   rejects duplicate outputs and cycles, and fixes an execution order
//! - [`Graph::evaluate`] runs every node once in that order, starting from
//!   the raw input values the caller supplies
//!
//! # Architecture
//!
//! - `graph`: nodes, graph construction and validation, scheduling
//! - `eval`: the per-evaluation data store and executor
//! - `error`: error types for both phases
//!
//! # Example
//!
//! ```rust
//! use tinydag_core::{Graph, Node};
//!
//! let add = |a: &f64, b: &f64| a + b;
//! let mul = |a: &f64, b: &f64| a * b;
//! let div = |a: &f64, b: &f64| a / b;
//!
//! let graph = Graph::new([
//!     Node::binary(["add1", "x"], "add2", add)?,
//!     Node::binary(["add1", "add2"], "mul", mul)?,
//!     Node::binary(["x", "y"], "add1", add)?,
//!     Node::binary(["mul", "z"], "div", div)?,
//! ])?;
//!
//! let outputs = graph.evaluate([("x", 5.0), ("y", 3.0), ("z", 3.0)])?;
//! assert_eq!(outputs["add1"], 8.0);
//! assert_eq!(outputs["add2"], 13.0);
//! assert_eq!(outputs["mul"], 104.0);
//! assert!((outputs["div"] - 104.0 / 3.0).abs() < 1e-12);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod eval;
pub mod graph;

pub use error::{
    BoxError, ConfigurationError, CyclicGraphError, GraphError, MissingInputError,
    NodeExecutionError, Result,
};
pub use eval::Outputs;
pub use graph::{Graph, GraphDescription, Node, NodeDescription, NodeFn, Wrapper};
