use thiserror::Error;

use crate::types::{ChunkId, ColumnId};

/// Errors raised while building, pruning or inspecting a logical plan.
///
/// All of them are rejected at the call that introduces them, before any node state is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Invalid column id {column_id}, relation has {column_count} column(s)")]
    InvalidColumnId {
        column_id: ColumnId,
        column_count: usize,
    },

    #[error("Invalid chunk id {chunk_id}, table has {chunk_count} chunk(s)")]
    InvalidChunkId { chunk_id: ChunkId, chunk_count: u32 },

    #[error("Column {0:?} not found")]
    ColumnNotFound(String),

    #[error("Column name {0:?} is ambiguous")]
    AmbiguousColumn(String),

    #[error("Table {0:?} does not exist")]
    UnknownTable(String),

    #[error("Table {0:?} already exists")]
    DuplicateTable(String),

    #[error("Invalid unique constraint: {0}")]
    InvalidConstraint(String),

    #[error("{kind} expects {expected} input(s), got {actual}")]
    InvalidInputCount {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Plan has no root node")]
    EmptyPlan,

    #[error("{operation} is not supported by {kind}")]
    Unsupported {
        operation: &'static str,
        kind: &'static str,
    },
}

pub type PlanResult<T> = Result<T, PlanError>;
