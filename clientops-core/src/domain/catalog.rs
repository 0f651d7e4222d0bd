//! Schema metadata read from a store's catalog

use serde::Serialize;

/// A base table and its columns
#[derive(Debug, Clone, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

/// One column as reported by `information_schema.columns`
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub position: i64,
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
}
