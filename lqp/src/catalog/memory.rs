use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;
use log::debug;
use parking_lot::RwLock;

use crate::catalog::{Catalog, TableMeta};
use crate::error::{PlanError, PlanResult};

/// Catalog keeping table metadata in memory.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: RwLock<HashMap<String, Arc<TableMeta>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table<S: Into<String>>(&self, name: S, table: TableMeta) -> PlanResult<()> {
        table.validate()?;

        let name = name.into();
        let mut tables = self.tables.write();
        if tables.contains_key(&name) {
            return Err(PlanError::DuplicateTable(name));
        }

        debug!(
            "Registering table {:?} with {} column(s) and {} chunk(s)",
            name,
            table.column_count(),
            table.chunk_count()
        );
        tables.insert(name, Arc::new(table));
        Ok(())
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    pub fn drop_table(&self, name: &str) -> PlanResult<Arc<TableMeta>> {
        self.tables
            .write()
            .remove(name)
            .ok_or_else(|| PlanError::UnknownTable(name.to_string()))
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.read().keys().cloned().sorted().collect()
    }
}

impl Catalog for MemoryCatalog {
    fn table(&self, name: &str) -> PlanResult<Arc<TableMeta>> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| PlanError::UnknownTable(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{Catalog, MemoryCatalog};
    use crate::error::PlanError;
    use crate::test_utils::int_int_float_table;

    #[test]
    fn test_add_and_drop_tables() {
        let catalog = MemoryCatalog::new();
        catalog.add_table("t_b", int_int_float_table()).unwrap();
        catalog.add_table("t_a", int_int_float_table()).unwrap();

        assert!(catalog.has_table("t_a"));
        assert_eq!(vec!["t_a".to_string(), "t_b".to_string()], catalog.table_names());
        assert_eq!(3, catalog.table("t_a").unwrap().column_count());

        assert_eq!(
            Err(PlanError::DuplicateTable("t_a".to_string())),
            catalog.add_table("t_a", int_int_float_table())
        );

        catalog.drop_table("t_a").unwrap();
        assert!(!catalog.has_table("t_a"));
        assert_eq!(
            PlanError::UnknownTable("t_a".to_string()),
            catalog.table("t_a").unwrap_err()
        );
        assert!(catalog.drop_table("t_a").is_err());
    }
}
