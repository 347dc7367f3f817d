//! Semantic properties derived for plan nodes.
//!
//! [`UniqueConstraintDefinition`] is the catalog-level form of a uniqueness constraint, addressed
//! by column id. Plan nodes expose the constraints surviving column pruning as
//! [`PlanUniqueConstraint`], and derive one [`FunctionalDependency`] per surviving constraint.

mod constraint;
pub use constraint::*;
mod functional_dependency;
pub use functional_dependency::*;
