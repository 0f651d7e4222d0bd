//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// Every operation surfaces one of these to its immediate caller. Nothing in
/// the core retries or swallows them, apart from the bounded retry around
/// opening a locked store file.
#[derive(Error, Debug)]
pub enum Error {
    /// Lookup miss on `users.username`. Non-fatal; nothing was written.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Connection, query or commit failure.
    #[error("Store error: {0}")]
    Store(String),

    /// An insert failed mid-batch. The whole batch was rolled back.
    #[error("Migration failed at row {row_index}: {source}")]
    Migration {
        row_index: usize,
        #[source]
        source: Box<Error>,
    },

    /// Column mapping or settings problem, detected before any I/O.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Wrap a failed insert with the zero-based position of the row
    pub fn migration(row_index: usize, source: Error) -> Self {
        Self::Migration {
            row_index,
            source: Box::new(source),
        }
    }

    /// Row position of a failed migration, if this is one
    pub fn row_index(&self) -> Option<usize> {
        match self {
            Self::Migration { row_index, .. } => Some(*row_index),
            _ => None,
        }
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_error_carries_row_index() {
        let err = Error::migration(1, Error::store("NOT NULL constraint failed"));
        assert_eq!(err.row_index(), Some(1));
        let msg = err.to_string();
        assert!(msg.contains("row 1"));
        assert!(msg.contains("NOT NULL"));
    }

    #[test]
    fn test_row_index_absent_for_other_errors() {
        assert_eq!(Error::UserNotFound("admin".into()).row_index(), None);
        assert_eq!(Error::configuration("bad").row_index(), None);
    }

    #[test]
    fn test_error_messages() {
        let err = Error::UserNotFound("admin".to_string());
        assert_eq!(err.to_string(), "User not found: admin");

        let err = Error::configuration("column count mismatch");
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
