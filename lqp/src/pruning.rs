//! Derivations shared by node kinds that support column and chunk pruning.
//!
//! Pruned ids are kept as sorted, duplicate free vectors. Column references keep original column
//! ids, but artifacts storing dense positions, such as index column lists and renumbered
//! constraint keys, are shifted left by the number of smaller pruned ids:
//!
//! ```text
//! shifted(c) = c - |{p in pruned | p < c}|
//! ```
//!
//! An artifact mentioning any pruned column is dropped as a whole.

use std::sync::Weak;

use itertools::Itertools;
use log::trace;

use crate::catalog::IndexStatistics;
use crate::plan::{PlanColumnReference, PlanNode};
use crate::properties::{
    ColumnReferenceSet, FunctionalDependency, PlanUniqueConstraint,
    UniqueConstraintDefinition,
};
use crate::types::{ColumnDefinition, ColumnId};

/// Sorts and deduplicates pruned ids.
pub fn normalize_pruned_ids<T, I>(ids: I) -> Vec<T>
where
    T: Ord,
    I: IntoIterator<Item = T>,
{
    ids.into_iter().sorted().dedup().collect()
}

/// Returns the first id that is not below `count`, if any. `ids` must be sorted.
pub fn first_out_of_range<T: Copy + Into<u32>>(ids: &[T], count: usize) -> Option<T> {
    ids.last()
        .copied()
        .filter(|id| Into::<u32>::into(*id) as usize >= count)
}

pub fn is_pruned<T: Ord>(id: &T, pruned: &[T]) -> bool {
    pruned.binary_search(id).is_ok()
}

/// Original ids of the columns surviving pruning, in ascending order.
pub fn surviving_column_ids(column_count: usize, pruned: &[ColumnId]) -> Vec<ColumnId> {
    (0..column_count)
        .map(ColumnId::from)
        .filter(|c| !is_pruned(c, pruned))
        .collect()
}

/// Position of a surviving column in the pruned output.
pub fn shift_column_id(column_id: ColumnId, pruned: &[ColumnId]) -> ColumnId {
    let smaller_pruned = pruned.partition_point(|p| *p < column_id);
    ColumnId::from(column_id.index() - smaller_pruned)
}

/// Shifts every column id, or returns `None` if any of them is pruned.
pub fn renumber_column_ids(
    column_ids: &[ColumnId],
    pruned: &[ColumnId],
) -> Option<Vec<ColumnId>> {
    column_ids
        .iter()
        .map(|c| (!is_pruned(c, pruned)).then(|| shift_column_id(*c, pruned)))
        .collect()
}

/// Indexes whose columns all survive, with column ids shifted to the pruned output.
pub fn filter_indexes(
    indexes: &[IndexStatistics],
    pruned: &[ColumnId],
) -> Vec<IndexStatistics> {
    indexes
        .iter()
        .filter_map(|index| {
            renumber_column_ids(&index.column_ids, pruned)
                .map(|column_ids| IndexStatistics::new(column_ids, index.name.clone()))
        })
        .collect()
}

/// Column references of a leaf node after pruning.
pub fn leaf_column_expressions(
    node: &Weak<PlanNode>,
    column_count: usize,
    pruned: &[ColumnId],
) -> Vec<PlanColumnReference> {
    surviving_column_ids(column_count, pruned)
        .into_iter()
        .map(|c| PlanColumnReference::from_weak(node.clone(), c))
        .collect()
}

/// Constraints of a leaf node whose key survives pruning, in declaration order.
pub fn leaf_constraints(
    node: &Weak<PlanNode>,
    constraints: &[UniqueConstraintDefinition],
    pruned: &[ColumnId],
) -> Vec<PlanUniqueConstraint> {
    constraints
        .iter()
        .filter_map(|constraint| {
            let renumbered = renumber_column_ids(constraint.columns(), pruned)?;
            let column_references = constraint
                .columns()
                .iter()
                .map(|c| PlanColumnReference::from_weak(node.clone(), *c))
                .collect();
            Some(PlanUniqueConstraint::new(
                constraint.with_columns(renumbered),
                column_references,
            ))
        })
        .collect()
}

/// Functional dependencies of a leaf node.
///
/// Each surviving constraint key `K` yields `K => columns \ K`, unless nothing remains on the right
/// hand side. A relation with any nullable column, pruned or not, yields no dependency at all.
pub fn leaf_functional_dependencies(
    node: &Weak<PlanNode>,
    column_definitions: &[ColumnDefinition],
    constraints: &[UniqueConstraintDefinition],
    pruned: &[ColumnId],
) -> Vec<FunctionalDependency> {
    if column_definitions.iter().any(|c| c.nullable) {
        trace!("Skipping functional dependencies of relation with nullable columns");
        return vec![];
    }

    let columns = leaf_column_expressions(node, column_definitions.len(), pruned);
    let constraints = leaf_constraints(node, constraints, pruned);
    functional_dependencies_from_constraints(&columns, &constraints)
}

/// Derives `K => columns \ K` for each constraint key `K`.
pub fn functional_dependencies_from_constraints(
    columns: &[PlanColumnReference],
    constraints: &[PlanUniqueConstraint],
) -> Vec<FunctionalDependency> {
    constraints
        .iter()
        .filter_map(|constraint| {
            let determinants: ColumnReferenceSet =
                constraint.column_references().iter().cloned().collect();
            let dependents: ColumnReferenceSet = columns
                .iter()
                .filter(|c| !determinants.contains(*c))
                .cloned()
                .collect();

            (!dependents.is_empty())
                .then(|| FunctionalDependency::new(determinants, dependents))
        })
        .collect()
}
