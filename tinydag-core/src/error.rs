//! Error Types
//!
//! Errors are split by the phase that raises them. Construction fails with
//! [`ConfigurationError`] or [`CyclicGraphError`]; evaluation fails with
//! [`MissingInputError`] or [`NodeExecutionError`]. [`GraphError`] wraps all
//! of them so callers can use `?` across both phases.

use thiserror::Error;

/// Boxed error returned by fallible node functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias using [`GraphError`].
pub type Result<T> = std::result::Result<T, GraphError>;

/// A node declaration or node set is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A node was declared with an empty output name.
    #[error("node output name must not be empty")]
    EmptyOutput,

    /// A node was given an empty display name.
    #[error("node name must not be empty")]
    EmptyName,

    /// One of a node's input names is empty.
    #[error("input #{position} of node '{node}' is an empty name")]
    EmptyInputName { node: String, position: usize },

    /// The number of declared inputs does not match the function's arity.
    #[error("node '{node}' expects {expected} input(s) but declares {actual}")]
    ArityMismatch {
        node: String,
        expected: usize,
        actual: usize,
    },

    /// Two nodes produce the same output.
    #[error("duplicate output '{output}': produced by both '{first}' and '{second}'")]
    DuplicateOutput {
        output: String,
        first: String,
        second: String,
    },

    /// Two nodes share a display name.
    #[error("duplicate node name '{name}'")]
    DuplicateName { name: String },
}

/// The dependency relation between nodes contains a cycle.
///
/// `cycle` lists node names along the dependency path, with the first node
/// repeated at the end, e.g. `["a", "b", "a"]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cycle detected: {}", .cycle.join(" -> "))]
pub struct CyclicGraphError {
    pub cycle: Vec<String>,
}

/// A node input was not present in the data store when the node ran.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing input '{input}' for node '{node}'")]
pub struct MissingInputError {
    pub input: String,
    pub node: String,
}

/// A node function returned an error.
#[derive(Debug, Error)]
#[error("node '{node}' failed: {source}")]
pub struct NodeExecutionError {
    pub node: String,
    #[source]
    pub source: BoxError,
}

/// Any error raised while building or evaluating a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Cyclic(#[from] CyclicGraphError),

    #[error(transparent)]
    MissingInput(#[from] MissingInputError),

    #[error(transparent)]
    NodeExecution(#[from] NodeExecutionError),

    /// A requested target is not the output of any node.
    #[error("unknown target '{0}': no node produces it")]
    UnknownTarget(String),
}

impl GraphError {
    /// Returns the configuration error, if this is one.
    pub fn as_configuration(&self) -> Option<&ConfigurationError> {
        match self {
            Self::Configuration(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the cycle error, if this is one.
    pub fn as_cyclic(&self) -> Option<&CyclicGraphError> {
        match self {
            Self::Cyclic(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the missing input error, if this is one.
    pub fn as_missing_input(&self) -> Option<&MissingInputError> {
        match self {
            Self::MissingInput(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the node execution error, if this is one.
    pub fn as_node_execution(&self) -> Option<&NodeExecutionError> {
        match self {
            Self::NodeExecution(err) => Some(err),
            _ => None,
        }
    }
}
