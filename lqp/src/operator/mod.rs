//! Node kinds of the logical plan.
//!
//! Leaves ([`MockNode`], [`StoredTableNode`]) read their columns and constraints from a local
//! definition list or from the catalog and support column pruning. Inner kinds ([`LimitNode`],
//! [`JoinNode`]) derive everything from their inputs.
mod join;
pub use join::*;
mod limit;
pub use limit::*;
mod mock;
pub use mock::*;
mod stored_table;
pub use stored_table::*;

use enum_as_inner::EnumAsInner;
use enum_dispatch::enum_dispatch;
use strum_macros::AsRefStr;

use crate::error::{PlanError, PlanResult};
use crate::plan::{PlanColumnReference, PlanNode};
use crate::properties::{FunctionalDependency, PlanUniqueConstraint};
use crate::types::{ChunkId, ColumnDefinition, ColumnId};

/// Logical relational operator.
///
/// Equality and hashing are structural and shallow, inputs are compared by [`PlanNode`].
#[derive(Clone, Debug, Hash, Eq, PartialEq, EnumAsInner, AsRefStr)]
#[enum_dispatch]
pub enum LogicalOperator {
    Mock(MockNode),
    StoredTable(StoredTableNode),
    Limit(LimitNode),
    Join(JoinNode),
}

/// Shared contract of all node kinds.
///
/// Derivation methods receive the node owning the operator, which gives access to inputs and to
/// the weak self reference used in column references.
#[enum_dispatch(LogicalOperator)]
pub trait OperatorTrait {
    fn kind(&self) -> &'static str;

    /// Number of inputs the operator expects.
    fn arity(&self) -> usize {
        0
    }

    fn description(&self, node: &PlanNode) -> String;

    fn derive_column_expressions(
        &self,
        node: &PlanNode,
    ) -> PlanResult<Vec<PlanColumnReference>>;

    fn derive_constraints(&self, node: &PlanNode) -> PlanResult<Vec<PlanUniqueConstraint>>;

    fn derive_functional_dependencies(
        &self,
        node: &PlanNode,
    ) -> PlanResult<Vec<FunctionalDependency>>;

    /// All columns before pruning, for leaves.
    fn original_column_definitions(&self) -> PlanResult<Vec<ColumnDefinition>> {
        Err(PlanError::Unsupported {
            operation: "Column definition lookup",
            kind: self.kind(),
        })
    }

    fn pruned_column_ids(&self) -> &[ColumnId] {
        &[]
    }

    fn pruned_chunk_ids(&self) -> &[ChunkId] {
        &[]
    }

    /// Replaces pruned column ids. `ids` is sorted and duplicate free.
    fn set_pruned_column_ids(&mut self, _ids: Vec<ColumnId>) -> PlanResult<()> {
        Err(PlanError::Unsupported {
            operation: "Column pruning",
            kind: self.kind(),
        })
    }

    /// Replaces pruned chunk ids. `ids` is sorted and duplicate free.
    fn set_pruned_chunk_ids(&mut self, _ids: Vec<ChunkId>) -> PlanResult<()> {
        Err(PlanError::Unsupported {
            operation: "Chunk pruning",
            kind: self.kind(),
        })
    }
}
