//! Relational store ports
//!
//! A store handle is one open connection. Services borrow it for the length
//! of a single operation and never keep it.

use crate::domain::result::Result;
use crate::domain::{ColumnInfo, Row, UserClientRow};

/// Access to `users(username, password)`
pub trait UserStore {
    /// Point lookup of the stored hash by username
    fn find_password_hash(&self, username: &str) -> Result<Option<String>>;

    /// Overwrite the stored hash in a single committed update
    ///
    /// Returns the number of rows changed.
    fn update_password_hash(&self, username: &str, password_hash: &str) -> Result<usize>;
}

/// Read side of a row migration
pub trait TableSource {
    /// Whether `table` is a base table in the store's own catalog
    fn table_exists(&self, table: &str) -> Result<bool>;

    /// Every row of `table`, projected onto `columns`, in store-native order
    fn read_rows(&self, table: &str, columns: &[String]) -> Result<Vec<Row>>;
}

/// Write side of a row migration
pub trait TableSink {
    /// Insert all rows and commit once
    ///
    /// On the first failing insert nothing from this call is kept and
    /// `Error::Migration` reports the zero-based row position.
    fn insert_rows(&self, table: &str, columns: &[String], rows: &[Row]) -> Result<usize>;
}

/// Read-only schema metadata
pub trait CatalogStore {
    /// Base tables in the default schema, sorted by name
    fn list_tables(&self) -> Result<Vec<String>>;

    /// Columns of one table in ordinal order
    fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>>;
}

/// Read-only users/clients join for the report
pub trait ReportStore {
    /// `users LEFT JOIN clients`, ordered by user id then client id
    fn users_with_clients(&self) -> Result<Vec<UserClientRow>>;
}
