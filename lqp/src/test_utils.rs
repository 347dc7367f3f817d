use std::sync::Arc;

use crate::catalog::{Catalog, TableMeta};
use crate::operator::{MockNode, StoredTableNode};
use crate::plan::{PlanNode, PlanNodeRef};
use crate::properties::UniqueConstraintDefinition;
use crate::types::{ChunkId, ColumnDefinition, ColumnId, DataType};

pub fn column_ids(ids: &[u32]) -> Vec<ColumnId> {
    ids.iter().copied().map(ColumnId::new).collect()
}

pub fn chunk_ids(ids: &[u32]) -> Vec<ChunkId> {
    ids.iter().copied().map(ChunkId::new).collect()
}

pub fn table_meta_from_json(json: &str) -> TableMeta {
    serde_json::from_str(json).unwrap()
}

/// Columns `a int, b int, c float` split into 4 chunks.
pub fn int_int_float_table() -> TableMeta {
    table_meta_from_json(
        r#"{
            "column_definitions": [
                {"name": "a", "data_type": "int"},
                {"name": "b", "data_type": "int"},
                {"name": "c", "data_type": "float"}
            ],
            "chunk_count": 4
        }"#,
    )
}

pub fn mock_node(
    column_definitions: Vec<ColumnDefinition>,
    name: Option<&str>,
    unique_constraints: Vec<UniqueConstraintDefinition>,
) -> PlanNodeRef {
    let mock = MockNode::new(
        column_definitions,
        name.map(ToString::to_string),
        unique_constraints,
    )
    .unwrap();
    PlanNode::new(mock.into(), vec![]).unwrap()
}

/// Mock node `abc` with non nullable columns `a int, b int, c float`.
pub fn abc_mock_node(unique_constraints: Vec<UniqueConstraintDefinition>) -> PlanNodeRef {
    mock_node(
        vec![
            ColumnDefinition::new(DataType::Int, "a"),
            ColumnDefinition::new(DataType::Int, "b"),
            ColumnDefinition::new(DataType::Float, "c"),
        ],
        Some("abc"),
        unique_constraints,
    )
}

pub fn stored_table_node(table_name: &str, catalog: Arc<dyn Catalog>) -> PlanNodeRef {
    let table = StoredTableNode::new(table_name, catalog).unwrap();
    PlanNode::new(table.into(), vec![]).unwrap()
}
