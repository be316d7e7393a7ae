//! Graph Nodes
//!
//! This module defines the computation step that lives in a graph: a list of
//! input names, the function applied to them, and the output name the result
//! is bound to.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{BoxError, ConfigurationError};

/// The function carried by a node.
///
/// It receives the resolved inputs positionally, in the order the node
/// declares them, and returns a single value.
pub type NodeFn<V> = Arc<dyn Fn(&[V]) -> Result<V, BoxError> + Send + Sync>;

/// Transforms a node function into another node function.
///
/// Wrappers are applied once, when a graph is built. They receive the name of
/// the node being wrapped along with its current function.
pub type Wrapper<V> = Arc<dyn Fn(&str, NodeFn<V>) -> NodeFn<V> + Send + Sync>;

/// Input names. Most nodes take a handful of inputs, so they stay inline.
pub type InputNames = SmallVec<[String; 4]>;

/// A single computation step in the graph.
///
/// Nodes are immutable once built. Cloning is cheap: the function is shared,
/// so the same node can be placed in several graphs.
pub struct Node<V> {
    /// Display identity used in errors and logs. Defaults to the output name.
    name: String,

    /// Input names, mapped positionally onto the function's arguments.
    inputs: InputNames,

    /// Name the result is stored under.
    output: String,

    function: NodeFn<V>,
}

impl<V> Node<V> {
    /// Create a node from a fallible function over its positional inputs.
    pub fn new<I, S, F>(
        inputs: I,
        output: impl Into<String>,
        function: F,
    ) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[V]) -> Result<V, BoxError> + Send + Sync + 'static,
    {
        let output = output.into();
        if output.is_empty() {
            return Err(ConfigurationError::EmptyOutput);
        }

        let inputs: InputNames = inputs.into_iter().map(Into::into).collect();
        if let Some(position) = inputs.iter().position(|input| input.is_empty()) {
            return Err(ConfigurationError::EmptyInputName {
                node: output,
                position,
            });
        }

        Ok(Self {
            name: output.clone(),
            inputs,
            output,
            function: Arc::new(function),
        })
    }

    /// Create a node from an infallible function over its positional inputs.
    pub fn from_fn<I, S, F>(
        inputs: I,
        output: impl Into<String>,
        function: F,
    ) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[V]) -> V + Send + Sync + 'static,
    {
        Self::new(inputs, output, move |args: &[V]| Ok(function(args)))
    }

    /// Create a node with no inputs.
    pub fn source<F>(output: impl Into<String>, function: F) -> Result<Self, ConfigurationError>
    where
        F: Fn() -> V + Send + Sync + 'static,
    {
        let output = output.into();
        let name = output.clone();
        Self::new(std::iter::empty::<String>(), output, move |args: &[V]| {
            match args {
                [] => Ok(function()),
                _ => Err(arity_error(&name, 0, args.len())),
            }
        })
    }

    /// Create a node with exactly one input.
    pub fn unary<F>(
        input: impl Into<String>,
        output: impl Into<String>,
        function: F,
    ) -> Result<Self, ConfigurationError>
    where
        F: Fn(&V) -> V + Send + Sync + 'static,
    {
        let output = output.into();
        let name = output.clone();
        Self::new([input.into()], output, move |args: &[V]| match args {
            [value] => Ok(function(value)),
            _ => Err(arity_error(&name, 1, args.len())),
        })
    }

    /// Create a node with exactly two inputs.
    ///
    /// Fails with [`ConfigurationError::ArityMismatch`] if `inputs` does not
    /// hold exactly two names.
    pub fn binary<I, S, F>(
        inputs: I,
        output: impl Into<String>,
        function: F,
    ) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&V, &V) -> V + Send + Sync + 'static,
    {
        let output = output.into();
        let inputs: InputNames = inputs.into_iter().map(Into::into).collect();
        if inputs.len() != 2 {
            return Err(ConfigurationError::ArityMismatch {
                node: output,
                expected: 2,
                actual: inputs.len(),
            });
        }

        let name = output.clone();
        Self::new(inputs, output, move |args: &[V]| match args {
            [lhs, rhs] => Ok(function(lhs, rhs)),
            _ => Err(arity_error(&name, 2, args.len())),
        })
    }

    /// Give the node a display name distinct from its output.
    pub fn with_name(mut self, name: impl Into<String>) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        self.name = name;
        Ok(self)
    }

    /// Get the node's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the input names, in positional order.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Get the output name.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Number of positional arguments the function takes.
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Check if the node takes no inputs.
    pub fn is_source(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Get the node's function.
    pub fn function(&self) -> &NodeFn<V> {
        &self.function
    }

    /// Invoke the function with already-resolved inputs.
    ///
    /// The argument count is checked against the declared inputs before the
    /// function runs.
    pub fn call(&self, args: &[V]) -> Result<V, BoxError> {
        if args.len() != self.inputs.len() {
            return Err(arity_error(&self.name, self.inputs.len(), args.len()));
        }
        (self.function)(args)
    }
}

fn arity_error(node: &str, expected: usize, actual: usize) -> BoxError {
    Box::new(ConfigurationError::ArityMismatch {
        node: node.to_string(),
        expected,
        actual,
    })
}

impl<V> Clone for Node<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            inputs: self.inputs.clone(),
            output: self.output.clone(),
            function: Arc::clone(&self.function),
        }
    }
}

impl<V> fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_defaults_to_output() {
        let node = Node::binary(["x", "y"], "add", |a: &i64, b: &i64| a + b).unwrap();
        assert_eq!(node.name(), "add");
        assert_eq!(node.output(), "add");
        assert_eq!(node.inputs(), ["x".to_string(), "y".to_string()]);
        assert_eq!(node.arity(), 2);
    }

    #[test]
    fn explicit_name_is_kept_apart_from_output() {
        let node = Node::binary(["x", "y"], "add_out", |a: &i64, b: &i64| a + b)
            .unwrap()
            .with_name("add")
            .unwrap();
        assert_eq!(node.name(), "add");
        assert_eq!(node.output(), "add_out");
    }

    #[test]
    fn empty_output_is_rejected() {
        let err = Node::unary("x", "", |v: &i64| *v).unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyOutput);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Node::unary("x", "y", |v: &i64| *v)
            .unwrap()
            .with_name("")
            .unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyName);
    }

    #[test]
    fn empty_input_name_is_rejected() {
        let err = Node::from_fn(["x", ""], "out", |args: &[i64]| args.iter().sum()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::EmptyInputName {
                node: "out".into(),
                position: 1,
            }
        );
    }

    #[test]
    fn binary_requires_two_inputs() {
        let err = Node::binary(["x"], "out", |a: &i64, b: &i64| a + b).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::ArityMismatch {
                node: "out".into(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn source_takes_no_inputs() {
        let node = Node::source("five", || 5_i64).unwrap();
        assert!(node.is_source());
        assert_eq!(node.call(&[]).unwrap(), 5);
    }

    #[test]
    fn call_checks_argument_count() {
        let node = Node::binary(["x", "y"], "add", |a: &i64, b: &i64| a + b).unwrap();
        assert_eq!(node.call(&[2, 3]).unwrap(), 5);

        let err = node.call(&[2]).unwrap_err();
        assert!(err.to_string().contains("expects 2 input(s) but declares 1"));
    }

    #[test]
    fn fallible_function_error_is_returned() {
        let node = Node::new(["x"], "checked", |args: &[i64]| {
            if args[0] < 0 {
                Err("negative input".into())
            } else {
                Ok(args[0])
            }
        })
        .unwrap();

        assert_eq!(node.call(&[3]).unwrap(), 3);
        assert_eq!(node.call(&[-1]).unwrap_err().to_string(), "negative input");
    }

    #[test]
    fn clones_share_function() {
        let node = Node::unary("x", "double", |v: &i64| v * 2).unwrap();
        let copy = node.clone();
        assert!(Arc::ptr_eq(node.function(), copy.function()));
    }
}
