//! Constraint builder and precedence graph.
//!
//! [`build_constraints`] turns a catalog into the effective, acyclic
//! [`ConstraintGraph`] for one run. The graph is the adjacency index every
//! later stage reads; nothing re-derives predecessor lists per task.

mod builder;
mod graph;

pub use builder::build_constraints;
pub use graph::{ConstraintGraph, Edge};
