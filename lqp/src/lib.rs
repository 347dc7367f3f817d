//! ## Background
//!
//! A logical query plan describes what a query computes, as a graph of relational operators,
//! before any execution strategy is chosen. The optimizer rewrites it repeatedly: it prunes
//! columns and chunks nobody reads, looks for equal subplans to share or cache, and uses
//! uniqueness and functional dependencies to simplify operators above.
//!
//! Plans here are dags rather than trees. A subplan consumed twice, e.g. by both sides of a
//! self join, is one shared node, so every rewrite of it is seen by all consumers unless the
//! optimizer copies it first.
//!
//! ## Design
//!
//! * [`plan`] Plan nodes, structural equality and hashing, deep copy, builder and explain.
//! * [`operator`] Node kinds: mock and stored table leaves, limit and join.
//! * [`pruning`] Shared pruning and renumbering rules of leaf nodes.
//! * [`properties`] Unique constraints and functional dependencies.
//! * [`catalog`] Table metadata lookup.
//! * [`cache`] GDFS cache and the plan cache built on it.
//! * [`context`] Optimizer configuration and context.

pub mod cache;
pub mod catalog;
pub mod context;
pub mod error;
pub mod operator;
pub mod plan;
pub mod properties;
pub mod pruning;
pub mod types;

#[cfg(test)]
mod test_utils;
