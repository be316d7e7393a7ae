//! Evaluation
//!
//! Executes a built [`Graph`](crate::Graph) against raw input values.
//! Evaluation never mutates the graph: all per-run state lives in a data
//! store owned by the call, so one graph can serve many evaluations, even
//! from several threads at once.

mod executor;
mod store;

pub use executor::Outputs;
