//! Row migrator - copies one table from a source store into a target store
//!
//! Rows are read in store-native order, the identity column is left behind
//! and the target assigns fresh identities. All inserts of one run share a
//! single transaction on the target: if any row fails, none are kept.
//!
//! Running the same migration twice copies every row twice. Callers track
//! completion themselves.

use std::path::Path;

use serde::Serialize;

use crate::adapters::duckdb::DuckDbStore;
use crate::domain::result::{Error, Result};
use crate::domain::ColumnMapping;
use crate::ports::{TableSink, TableSource};

/// Result of a completed migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub table: String,
    pub rows_migrated: usize,
}

/// Copies tables according to configured column mappings
pub struct RowMigrator {
    mappings: Vec<ColumnMapping>,
}

impl RowMigrator {
    pub fn new(mappings: Vec<ColumnMapping>) -> Self {
        Self { mappings }
    }

    /// Mapping configured for `table_name`
    pub fn mapping(&self, table_name: &str) -> Result<&ColumnMapping> {
        self.mappings
            .iter()
            .find(|m| m.table == table_name)
            .ok_or_else(|| {
                Error::configuration(format!("no column mapping configured for '{}'", table_name))
            })
    }

    /// Tables that have a mapping
    pub fn tables(&self) -> Vec<&str> {
        self.mappings.iter().map(|m| m.table.as_str()).collect()
    }

    /// Copy every row of `table_name` from `source` into `target`
    pub fn migrate(
        &self,
        table_name: &str,
        source: &impl TableSource,
        target: &impl TableSink,
    ) -> Result<MigrationReport> {
        let mapping = self.mapping(table_name)?;
        mapping.validate()?;

        if !source.table_exists(&mapping.table)? {
            return Err(Error::UnknownTable(mapping.table.clone()));
        }

        let rows = source.read_rows(&mapping.table, &mapping.source_columns)?;
        let rows_migrated = target.insert_rows(&mapping.table, &mapping.target_columns, &rows)?;

        Ok(MigrationReport {
            table: mapping.table.clone(),
            rows_migrated,
        })
    }

    /// Same as [`migrate`](Self::migrate) between two database files
    ///
    /// Both connections are opened for this call only. The mapping is
    /// checked before either file is touched.
    pub fn migrate_between(
        &self,
        table_name: &str,
        source_path: &Path,
        target_path: &Path,
    ) -> Result<MigrationReport> {
        self.mapping(table_name)?.validate()?;

        if same_file(source_path, target_path) {
            return Err(Error::configuration(format!(
                "source and target are the same database: {}",
                source_path.display()
            )));
        }
        let source = DuckDbStore::open_existing(source_path)?;
        let target = DuckDbStore::open_existing(target_path)?;
        self.migrate(table_name, &source, &target)
    }
}

impl Default for RowMigrator {
    fn default() -> Self {
        Self::new(vec![ColumnMapping::payments()])
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
