//! ClientOps Core - operator tooling for the client-management app stores
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Entities, column mappings, hashing settings and the error taxonomy
//! - **ports**: Store traits the services depend on
//! - **services**: Credential verification/repair, row migration, inspection, reporting
//! - **adapters**: DuckDB implementation of the store ports

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};

use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use adapters::duckdb::DuckDbStore;
pub use domain::result::{Error, Result};
pub use domain::{ColumnMapping, FieldValue, HashScheme, HashingConfig, Row};
pub use services::{LogEntry, LogEvent, LogFilter, LoggingService};

/// Main context for operator commands
///
/// Holds configuration and the services built from it. It never holds a
/// store connection: each operation opens its own and drops it on return.
pub struct ClientOpsContext {
    pub config: Config,
    pub ops_dir: PathBuf,
    pub credential_verifier: CredentialVerifier,
    pub row_migrator: RowMigrator,
}

impl ClientOpsContext {
    /// Load settings from `ops_dir` and build the services
    ///
    /// Column mappings are checked when a migration uses them, so a bad
    /// mapping only fails `migrate` for its own table.
    pub fn new(ops_dir: &Path) -> Result<Self> {
        let config = Config::load(ops_dir)?;

        let hashing = PasswordHashing::new(config.hashing.clone())?;
        let credential_verifier = CredentialVerifier::new(hashing);
        let row_migrator = RowMigrator::new(config.migrations.clone());

        Ok(Self {
            config,
            ops_dir: ops_dir.to_path_buf(),
            credential_verifier,
            row_migrator,
        })
    }

    /// Path of the application's store
    pub fn app_db(&self) -> &Path {
        &self.config.database.app_db
    }

    /// Path of the store payments are migrated out of
    pub fn legacy_db(&self) -> &Path {
        &self.config.database.legacy_db
    }

    /// Open the application's store for one operation
    pub fn open_app_db(&self) -> Result<DuckDbStore> {
        DuckDbStore::open_existing(self.app_db())
    }

    /// Login smoke test client for the configured endpoint
    pub fn login_check(&self, url: Option<&str>) -> Result<LoginCheck> {
        LoginCheck::new(url.unwrap_or(&self.config.login.url))
    }
}
