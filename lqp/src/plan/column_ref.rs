use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Weak;

use crate::plan::{PlanNode, PlanNodeMapping, PlanNodeRef};
use crate::types::{ColumnDefinition, ColumnId};

/// Reference to a column of the plan node it originates from.
///
/// The reference never keeps its node alive. The column id is always the id in the node's
/// original numbering, so references survive pruning of other columns unchanged.
///
/// Two references are equal when they carry the same column id and point to the same node, or to
/// structurally equal nodes.
#[derive(Clone)]
pub struct PlanColumnReference {
    original_node: Weak<PlanNode>,
    original_column_id: ColumnId,
}

impl PlanColumnReference {
    pub fn new(original_node: &PlanNodeRef, original_column_id: ColumnId) -> Self {
        Self {
            original_node: PlanNodeRef::downgrade(original_node),
            original_column_id,
        }
    }

    pub(crate) fn from_weak(original_node: Weak<PlanNode>, original_column_id: ColumnId) -> Self {
        Self {
            original_node,
            original_column_id,
        }
    }

    /// `None` once the originating node has been dropped.
    pub fn original_node(&self) -> Option<PlanNodeRef> {
        self.original_node.upgrade()
    }

    pub fn original_column_id(&self) -> ColumnId {
        self.original_column_id
    }

    pub fn column_definition(&self) -> Option<ColumnDefinition> {
        self.original_node()?
            .original_column_definitions()
            .ok()?
            .into_iter()
            .nth(self.original_column_id.index())
    }

    pub fn is_nullable(&self) -> Option<bool> {
        self.column_definition().map(|c| c.nullable)
    }

    /// Points the reference at the copy of its node made by
    /// [`PlanNode::deep_copy_with_mapping`].
    pub fn remap(&self, mapping: &PlanNodeMapping) -> Option<PlanColumnReference> {
        let node = self.original_node()?;
        mapping
            .get(&node.id())
            .map(|copy| PlanColumnReference::new(copy, self.original_column_id))
    }
}

impl PartialEq for PlanColumnReference {
    fn eq(&self, other: &Self) -> bool {
        if self.original_column_id != other.original_column_id {
            return false;
        }

        if Weak::ptr_eq(&self.original_node, &other.original_node) {
            return true;
        }

        match (self.original_node(), other.original_node()) {
            (Some(this_node), Some(other_node)) => this_node == other_node,
            _ => false,
        }
    }
}

impl Eq for PlanColumnReference {}

impl Hash for PlanColumnReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Some(node) = self.original_node() {
            node.hash(state);
        }
        self.original_column_id.hash(state);
    }
}

impl Debug for PlanColumnReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.column_definition() {
            Some(column) => write!(f, "{}", column.name),
            None => write!(f, "<expired>#{}", self.original_column_id),
        }
    }
}
