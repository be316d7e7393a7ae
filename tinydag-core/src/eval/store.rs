//! Data Store
//!
//! The name -> value mapping a single evaluation works against. It is seeded
//! with the caller's raw inputs, receives each node's output as the node
//! runs, and is dropped when the evaluation returns.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::error::MissingInputError;
use crate::graph::Node;

/// Resolved positional arguments for one node call.
pub(crate) type Args<V> = SmallVec<[V; 4]>;

#[derive(Debug, Clone)]
pub(crate) struct DataStore<V> {
    values: HashMap<String, V>,
}

impl<V> DataStore<V> {
    /// Seed a store with raw input values.
    ///
    /// Later pairs win if a name is repeated.
    pub fn from_raw<I, K>(raw: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        Self {
            values: raw.into_iter().map(|(name, value)| (name.into(), value)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Bind `value` to `name`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: V) {
        self.values.insert(name.into(), value);
    }

    /// Move a value out of the store.
    pub fn take(&mut self, name: &str) -> Option<V> {
        self.values.remove(name)
    }
}

impl<V: Clone> DataStore<V> {
    /// Look up the node's inputs in declaration order.
    ///
    /// Fails on the first input that is not in the store.
    pub fn resolve(&self, node: &Node<V>) -> Result<Args<V>, MissingInputError> {
        node.inputs()
            .iter()
            .map(|input| {
                self.values
                    .get(input.as_str())
                    .cloned()
                    .ok_or_else(|| MissingInputError {
                        input: input.clone(),
                        node: node.name().to_string(),
                    })
            })
            .collect()
    }
}
