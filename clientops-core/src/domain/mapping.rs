//! Column mapping between a source table and its target table

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"))
}

/// Check that `name` is a plain SQL identifier
pub fn validate_identifier(name: &str) -> Result<()> {
    if identifier_regex().is_match(name) {
        Ok(())
    } else {
        Err(Error::configuration(format!(
            "'{}' is not a valid table or column name",
            name
        )))
    }
}

/// Double-quote an identifier for embedding in SQL
///
/// Callers validate first; quoting keeps reserved words usable.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Ordered read/insert column lists for one table
///
/// `source_columns[i]` is inserted into `target_columns[i]`. The identity
/// column is never read: the target store assigns a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub table: String,
    #[serde(default = "default_identity_column")]
    pub identity_column: String,
    pub source_columns: Vec<String>,
    pub target_columns: Vec<String>,
}

fn default_identity_column() -> String {
    "id".to_string()
}

impl ColumnMapping {
    /// Mapping that uses the same column names on both sides
    pub fn same_columns(table: impl Into<String>, columns: &[&str]) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        Self {
            table: table.into(),
            identity_column: default_identity_column(),
            source_columns: columns.clone(),
            target_columns: columns,
        }
    }

    /// Layout of the application's `paiements` table
    pub fn payments() -> Self {
        Self::same_columns(
            "paiements",
            &["client_id", "montant", "date_paiement", "enregistre_par"],
        )
    }

    /// Reject mappings that would misplace values
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.table)?;
        validate_identifier(&self.identity_column)?;

        if self.source_columns.is_empty() {
            return Err(Error::configuration(format!(
                "mapping for '{}' has no columns",
                self.table
            )));
        }
        if self.source_columns.len() != self.target_columns.len() {
            return Err(Error::configuration(format!(
                "mapping for '{}' reads {} column(s) but inserts {}",
                self.table,
                self.source_columns.len(),
                self.target_columns.len()
            )));
        }

        for column in self.source_columns.iter().chain(self.target_columns.iter()) {
            validate_identifier(column)?;
            if column.eq_ignore_ascii_case(&self.identity_column) {
                return Err(Error::configuration(format!(
                    "mapping for '{}' must not copy identity column '{}'",
                    self.table, self.identity_column
                )));
            }
        }

        Ok(())
    }

    /// `SELECT` over the source columns, in store-native order
    pub fn select_sql(&self) -> String {
        format!(
            "SELECT {} FROM {}",
            join_quoted(&self.source_columns),
            quote_identifier(&self.table)
        )
    }

    /// Parameterized `INSERT` over the target columns
    pub fn insert_sql(&self) -> String {
        insert_sql(&self.table, &self.target_columns)
    }
}

pub(crate) fn join_quoted(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn insert_sql(table: &str, columns: &[String]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table),
        join_quoted(columns),
        placeholders
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payments_mapping_is_valid() {
        let mapping = ColumnMapping::payments();
        assert!(mapping.validate().is_ok());
        assert_eq!(mapping.identity_column, "id");
        assert_eq!(mapping.source_columns.len(), 4);
    }

    #[test]
    fn test_arity_mismatch_is_configuration_error() {
        let mut mapping = ColumnMapping::payments();
        mapping.target_columns.pop();
        let err = mapping.validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("reads 4 column(s) but inserts 3"));
    }

    #[test]
    fn test_empty_mapping_rejected() {
        let mapping = ColumnMapping::same_columns("paiements", &[]);
        assert!(matches!(mapping.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_identity_column_cannot_be_copied() {
        let mapping = ColumnMapping::same_columns("paiements", &["id", "client_id"]);
        let err = mapping.validate().unwrap_err();
        assert!(err.to_string().contains("identity column"));
    }

    #[test]
    fn test_injection_in_names_rejected() {
        let mapping = ColumnMapping::same_columns("paiements; DROP TABLE users", &["montant"]);
        assert!(matches!(mapping.validate(), Err(Error::Configuration(_))));

        let mapping = ColumnMapping::same_columns("paiements", &["montant) --"]);
        assert!(matches!(mapping.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_generated_sql() {
        let mapping = ColumnMapping::same_columns("paiements", &["client_id", "montant"]);
        assert_eq!(
            mapping.select_sql(),
            r#"SELECT "client_id", "montant" FROM "paiements""#
        );
        assert_eq!(
            mapping.insert_sql(),
            r#"INSERT INTO "paiements" ("client_id", "montant") VALUES (?, ?)"#
        );
    }

    #[test]
    fn test_deserialize_defaults_identity() {
        let mapping: ColumnMapping = serde_json::from_str(
            r#"{"table": "paiements", "sourceColumns": ["a"], "targetColumns": ["b"]}"#,
        )
        .unwrap();
        assert_eq!(mapping.identity_column, "id");
    }
}
