//! Serializable Graph Structure
//!
//! A plain-data snapshot of a built graph: node names, their inputs and
//! outputs, and the derived execution order. Renderers and other external
//! tools consume this instead of the graph itself, which holds functions.

use serde::{Deserialize, Serialize};

/// One node as seen from outside the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Node display name
    pub name: String,
    /// Input names in positional order
    pub inputs: Vec<String>,
    /// Output name
    pub output: String,
    /// Names of the nodes producing this node's inputs
    #[serde(default)]
    pub upstream: Vec<String>,
}

/// Structure of a whole graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDescription {
    /// Nodes in declaration order
    pub nodes: Vec<NodeDescription>,
    /// Names the caller has to supply at evaluation time
    pub raw_inputs: Vec<String>,
    /// Node names in the order they run
    pub execution_order: Vec<String>,
}

impl GraphDescription {
    /// Edges from each input name to the node consuming it.
    ///
    /// Raw inputs appear as sources, so the result covers every arrow a
    /// diagram of the graph needs.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.nodes
            .iter()
            .flat_map(|node| {
                node.inputs
                    .iter()
                    .map(move |input| (input.as_str(), node.name.as_str()))
            })
            .collect()
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
