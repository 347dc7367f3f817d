//! Read-only view of the storage layer consumed by stored table nodes.
//!
//! The storage engine itself lives elsewhere. Plan nodes only need column definitions, the chunk
//! count, soft unique constraints and secondary index definitions of a table, which are described
//! by [`TableMeta`] and looked up through the [`Catalog`] trait.

mod memory;
pub use memory::*;

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::properties::UniqueConstraintDefinition;
use crate::types::{ColumnDefinition, ColumnId};

/// Catalog lookups are synchronous and fail with [`PlanError::UnknownTable`].
pub trait Catalog: Debug + Send + Sync {
    fn table(&self, name: &str) -> PlanResult<Arc<TableMeta>>;
}

/// Definition of a secondary index over an ordered list of columns.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct IndexStatistics {
    pub column_ids: Vec<ColumnId>,
    pub name: String,
}

impl IndexStatistics {
    pub fn new<S: Into<String>>(column_ids: Vec<ColumnId>, name: S) -> Self {
        Self {
            column_ids,
            name: name.into(),
        }
    }
}

/// Metadata of one stored table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableMeta {
    column_definitions: Vec<ColumnDefinition>,
    chunk_count: u32,
    #[serde(default)]
    soft_unique_constraints: Vec<UniqueConstraintDefinition>,
    #[serde(default)]
    indexes: Vec<IndexStatistics>,
}

impl TableMeta {
    pub fn new(column_definitions: Vec<ColumnDefinition>, chunk_count: u32) -> Self {
        Self {
            column_definitions,
            chunk_count,
            soft_unique_constraints: vec![],
            indexes: vec![],
        }
    }

    pub fn column_definitions(&self) -> &[ColumnDefinition] {
        &self.column_definitions
    }

    pub fn column_count(&self) -> usize {
        self.column_definitions.len()
    }

    pub fn chunk_count(&self) -> u32 {
        self.chunk_count
    }

    pub fn soft_unique_constraints(&self) -> &[UniqueConstraintDefinition] {
        &self.soft_unique_constraints
    }

    pub fn indexes(&self) -> &[IndexStatistics] {
        &self.indexes
    }

    pub fn add_soft_unique_constraint(
        &mut self,
        constraint: UniqueConstraintDefinition,
    ) -> PlanResult<()> {
        constraint.validate(self.column_count())?;
        self.soft_unique_constraints.push(constraint);
        Ok(())
    }

    pub fn with_soft_unique_constraint(
        mut self,
        constraint: UniqueConstraintDefinition,
    ) -> PlanResult<Self> {
        self.add_soft_unique_constraint(constraint)?;
        Ok(self)
    }

    pub fn create_index<S: Into<String>>(
        &mut self,
        column_ids: Vec<ColumnId>,
        name: S,
    ) -> PlanResult<()> {
        self.check_column_ids(&column_ids)?;
        self.indexes.push(IndexStatistics::new(column_ids, name));
        Ok(())
    }

    pub fn with_index<S: Into<String>>(
        mut self,
        column_ids: Vec<ColumnId>,
        name: S,
    ) -> PlanResult<Self> {
        self.create_index(column_ids, name)?;
        Ok(self)
    }

    /// Validates constraints and indexes, e.g. after deserialization.
    pub fn validate(&self) -> PlanResult<()> {
        for constraint in &self.soft_unique_constraints {
            constraint.validate(self.column_count())?;
        }
        for index in &self.indexes {
            self.check_column_ids(&index.column_ids)?;
        }
        Ok(())
    }

    fn check_column_ids(&self, column_ids: &[ColumnId]) -> PlanResult<()> {
        match column_ids.iter().find(|c| c.index() >= self.column_count()) {
            Some(column_id) => Err(PlanError::InvalidColumnId {
                column_id: *column_id,
                column_count: self.column_count(),
            }),
            None => Ok(()),
        }
    }
}
