use std::hash::{Hash, Hasher};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::plan::PlanColumnReference;
use crate::types::ColumnId;

/// A soft unique constraint over columns of one relation, addressed by column id.
///
/// The key keeps its declaration order, but two constraints are equal whenever their key sets and
/// primary key flags match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UniqueConstraintDefinition {
    columns: Vec<ColumnId>,
    #[serde(default)]
    is_primary_key: bool,
}

impl UniqueConstraintDefinition {
    pub fn new<I: IntoIterator<Item = ColumnId>>(columns: I) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            is_primary_key: false,
        }
    }

    pub fn primary_key<I: IntoIterator<Item = ColumnId>>(columns: I) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            is_primary_key: true,
        }
    }

    /// Key columns in declaration order.
    pub fn columns(&self) -> &[ColumnId] {
        &self.columns
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }

    pub fn contains(&self, column_id: ColumnId) -> bool {
        self.columns.contains(&column_id)
    }

    /// Checks the key against a relation with `column_count` columns.
    pub fn validate(&self, column_count: usize) -> PlanResult<()> {
        if self.columns.is_empty() {
            return Err(PlanError::InvalidConstraint("empty key".to_string()));
        }

        if let Some(duplicated) = self.columns.iter().duplicates().next() {
            return Err(PlanError::InvalidConstraint(format!(
                "column {} appears more than once in key",
                duplicated
            )));
        }

        match self.columns.iter().find(|c| c.index() >= column_count) {
            Some(column_id) => Err(PlanError::InvalidColumnId {
                column_id: *column_id,
                column_count,
            }),
            None => Ok(()),
        }
    }

    /// Same constraint with its key replaced, e.g. after renumbering.
    pub(crate) fn with_columns(&self, columns: Vec<ColumnId>) -> Self {
        Self {
            columns,
            is_primary_key: self.is_primary_key,
        }
    }
}

impl PartialEq for UniqueConstraintDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.is_primary_key == other.is_primary_key
            && self.columns.len() == other.columns.len()
            && self.columns.iter().sorted().eq(other.columns.iter().sorted())
    }
}

impl Eq for UniqueConstraintDefinition {}

impl Hash for UniqueConstraintDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for column_id in self.columns.iter().sorted() {
            column_id.hash(state);
        }
        self.is_primary_key.hash(state);
    }
}

/// A unique constraint that survived pruning, as exposed by a plan node.
///
/// `definition` addresses columns by their position in the node's pruned output, while
/// `column_references` point back at the node using original column ids.
#[derive(Clone, Debug)]
pub struct PlanUniqueConstraint {
    definition: UniqueConstraintDefinition,
    column_references: Vec<PlanColumnReference>,
}

impl PlanUniqueConstraint {
    pub fn new(
        definition: UniqueConstraintDefinition,
        column_references: Vec<PlanColumnReference>,
    ) -> Self {
        Self {
            definition,
            column_references,
        }
    }

    pub fn definition(&self) -> &UniqueConstraintDefinition {
        &self.definition
    }

    pub fn column_references(&self) -> &[PlanColumnReference] {
        &self.column_references
    }

    pub fn is_primary_key(&self) -> bool {
        self.definition.is_primary_key()
    }
}

impl PartialEq for PlanUniqueConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.definition == other.definition
            && self.column_references.len() == other.column_references.len()
            && self
                .column_references
                .iter()
                .all(|r| other.column_references.contains(r))
    }
}

impl Eq for PlanUniqueConstraint {}
