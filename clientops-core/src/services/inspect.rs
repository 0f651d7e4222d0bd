//! Schema inspector - read-only table and column listing

use crate::domain::result::{Error, Result};
use crate::domain::TableInfo;
use crate::ports::CatalogStore;

/// Lists tables and their columns from a store's catalog
pub struct SchemaInspector;

impl SchemaInspector {
    /// Describe every table, or only `table` when given
    ///
    /// A requested table must appear in the catalog listing; its name is
    /// only ever bound as a query parameter.
    pub fn inspect(store: &impl CatalogStore, table: Option<&str>) -> Result<Vec<TableInfo>> {
        let tables = store.list_tables()?;

        let selected: Vec<String> = match table {
            Some(name) => {
                let found = tables
                    .into_iter()
                    .find(|t| t == name)
                    .ok_or_else(|| Error::UnknownTable(name.to_string()))?;
                vec![found]
            }
            None => tables,
        };

        selected
            .into_iter()
            .map(|name| {
                let columns = store.describe_table(&name)?;
                Ok(TableInfo { name, columns })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::DuckDbStore;

    fn store() -> DuckDbStore {
        let store = DuckDbStore::open_in_memory().unwrap();
        store
            .execute_batch(
                "CREATE TABLE users (id INTEGER PRIMARY KEY, username VARCHAR NOT NULL, password VARCHAR);
                 CREATE TABLE paiements (id INTEGER PRIMARY KEY, client_id INTEGER, montant DOUBLE DEFAULT 0);",
            )
            .unwrap();
        store
    }

    #[test]
    fn test_inspect_all_tables() {
        let tables = SchemaInspector::inspect(&store(), None).unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["paiements", "users"]);
        assert_eq!(tables[1].columns.len(), 3);
        assert_eq!(tables[1].columns[1].name, "username");
        assert!(!tables[1].columns[1].nullable);
    }

    #[test]
    fn test_inspect_single_table() {
        let tables = SchemaInspector::inspect(&store(), Some("paiements")).unwrap();
        assert_eq!(tables.len(), 1);
        let montant = &tables[0].columns[2];
        assert_eq!(montant.name, "montant");
        assert_eq!(montant.data_type, "DOUBLE");
        assert!(montant.default.is_some());
    }

    #[test]
    fn test_inspect_unknown_table() {
        let err =
            SchemaInspector::inspect(&store(), Some("users); DROP TABLE users; --")).unwrap_err();
        assert!(matches!(err, Error::UnknownTable(_)));
    }

    #[test]
    fn test_inspect_empty_store() {
        let store = DuckDbStore::open_in_memory().unwrap();
        assert!(SchemaInspector::inspect(&store, None).unwrap().is_empty());
    }
}
