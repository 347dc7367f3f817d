//! Identifiers and column-level value types shared by every plan node.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display as StrumDisplay, EnumString};

/// Position of a column in a relation's original, pre-pruning column list.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ColumnId(u32);

impl ColumnId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for ColumnId {
    fn from(idx: usize) -> Self {
        Self(idx as u32)
    }
}

/// Position of a chunk (horizontal partition) in a stored table.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ChunkId(u32);

impl ChunkId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

#[derive(
    Copy,
    Clone,
    Debug,
    Hash,
    Eq,
    PartialEq,
    AsRefStr,
    StrumDisplay,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    Long,
    Float,
    Double,
    String,
    Null,
}

/// Name, type and nullability of one column.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnDefinition {
    /// A non-nullable column.
    pub fn new<S: Into<String>>(data_type: DataType, name: S) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}
