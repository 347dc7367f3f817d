use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::catalog::{Catalog, IndexStatistics, TableMeta};
use crate::error::{PlanError, PlanResult};
use crate::operator::OperatorTrait;
use crate::plan::{PlanColumnReference, PlanNode};
use crate::properties::{FunctionalDependency, PlanUniqueConstraint};
use crate::pruning::{
    filter_indexes, first_out_of_range, leaf_column_expressions, leaf_constraints,
    leaf_functional_dependencies,
};
use crate::types::{ChunkId, ColumnDefinition, ColumnId};

/// Reference to a table of the catalog, with column and chunk pruning information.
///
/// Columns, constraints and indexes are looked up in the catalog on demand. Two nodes are equal
/// when table name, pruned chunks and pruned columns match; the catalog handle is not compared.
#[derive(Clone)]
pub struct StoredTableNode {
    table_name: String,
    catalog: Arc<dyn Catalog>,
    pruned_chunk_ids: Vec<ChunkId>,
    pruned_column_ids: Vec<ColumnId>,
}

impl StoredTableNode {
    /// Fails with [`PlanError::UnknownTable`] if the catalog has no such table.
    pub fn new<S: Into<String>>(table_name: S, catalog: Arc<dyn Catalog>) -> PlanResult<Self> {
        let table_name = table_name.into();
        catalog.table(&table_name)?;

        Ok(Self {
            table_name,
            catalog,
            pruned_chunk_ids: vec![],
            pruned_column_ids: vec![],
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn table(&self) -> PlanResult<Arc<TableMeta>> {
        self.catalog.table(&self.table_name)
    }

    /// Indexes over surviving columns only, with column ids shifted to the pruned output.
    pub fn indexes_statistics(&self) -> PlanResult<Vec<IndexStatistics>> {
        Ok(filter_indexes(self.table()?.indexes(), &self.pruned_column_ids))
    }
}

impl PartialEq for StoredTableNode {
    fn eq(&self, other: &Self) -> bool {
        self.table_name == other.table_name
            && self.pruned_chunk_ids == other.pruned_chunk_ids
            && self.pruned_column_ids == other.pruned_column_ids
    }
}

impl Eq for StoredTableNode {}

impl Hash for StoredTableNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.table_name.hash(state);
        self.pruned_chunk_ids.hash(state);
        self.pruned_column_ids.hash(state);
    }
}

impl Debug for StoredTableNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredTableNode")
            .field("table_name", &self.table_name)
            .field("pruned_chunk_ids", &self.pruned_chunk_ids)
            .field("pruned_column_ids", &self.pruned_column_ids)
            .finish()
    }
}

impl OperatorTrait for StoredTableNode {
    fn kind(&self) -> &'static str {
        "StoredTable"
    }

    fn description(&self, _node: &PlanNode) -> String {
        let (chunk_count, column_count) = match self.table() {
            Ok(table) => (
                table.chunk_count().to_string(),
                table.column_count().to_string(),
            ),
            Err(_) => ("?".to_string(), "?".to_string()),
        };

        format!(
            "[StoredTable] Name: '{}' pruned: {}/{} chunk(s), {}/{} column(s)",
            self.table_name,
            self.pruned_chunk_ids.len(),
            chunk_count,
            self.pruned_column_ids.len(),
            column_count
        )
    }

    fn derive_column_expressions(
        &self,
        node: &PlanNode,
    ) -> PlanResult<Vec<PlanColumnReference>> {
        Ok(leaf_column_expressions(
            node.weak_ref(),
            self.table()?.column_count(),
            &self.pruned_column_ids,
        ))
    }

    fn derive_constraints(&self, node: &PlanNode) -> PlanResult<Vec<PlanUniqueConstraint>> {
        Ok(leaf_constraints(
            node.weak_ref(),
            self.table()?.soft_unique_constraints(),
            &self.pruned_column_ids,
        ))
    }

    fn derive_functional_dependencies(
        &self,
        node: &PlanNode,
    ) -> PlanResult<Vec<FunctionalDependency>> {
        let table = self.table()?;
        Ok(leaf_functional_dependencies(
            node.weak_ref(),
            table.column_definitions(),
            table.soft_unique_constraints(),
            &self.pruned_column_ids,
        ))
    }

    fn original_column_definitions(&self) -> PlanResult<Vec<ColumnDefinition>> {
        Ok(self.table()?.column_definitions().to_vec())
    }

    fn pruned_column_ids(&self) -> &[ColumnId] {
        &self.pruned_column_ids
    }

    fn pruned_chunk_ids(&self) -> &[ChunkId] {
        &self.pruned_chunk_ids
    }

    fn set_pruned_column_ids(&mut self, ids: Vec<ColumnId>) -> PlanResult<()> {
        let column_count = self.table()?.column_count();
        if let Some(column_id) = first_out_of_range(&ids, column_count) {
            return Err(PlanError::InvalidColumnId {
                column_id,
                column_count,
            });
        }

        self.pruned_column_ids = ids;
        Ok(())
    }

    fn set_pruned_chunk_ids(&mut self, ids: Vec<ChunkId>) -> PlanResult<()> {
        let chunk_count = self.table()?.chunk_count();
        if let Some(chunk_id) = first_out_of_range(&ids, chunk_count as usize) {
            return Err(PlanError::InvalidChunkId {
                chunk_id,
                chunk_count,
            });
        }

        self.pruned_chunk_ids = ids;
        Ok(())
    }
}
