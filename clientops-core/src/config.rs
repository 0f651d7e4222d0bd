//! Configuration management
//!
//! Settings live in `settings.json` inside the operator directory:
//! ```json
//! {
//!   "database": { "appDb": "clients.db", "legacyDb": "database.db" },
//!   "hashing": { "scheme": "bcrypt", "bcryptCost": 12 },
//!   "migrations": [ { "table": "paiements", "sourceColumns": [...], "targetColumns": [...] } ],
//!   "login": { "url": "http://localhost:5000/login" }
//! }
//! ```
//! Every field is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{ColumnMapping, HashingConfig};
use crate::services::login_check::DEFAULT_LOGIN_URL;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSettings {
    /// Store the application runs on (users, clients, paiements)
    #[serde(default = "default_app_db")]
    pub app_db: PathBuf,
    /// Older store that payments are migrated out of
    #[serde(default = "default_legacy_db")]
    pub legacy_db: PathBuf,
}

fn default_app_db() -> PathBuf {
    PathBuf::from("clients.db")
}

fn default_legacy_db() -> PathBuf {
    PathBuf::from("database.db")
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            app_db: default_app_db(),
            legacy_db: default_legacy_db(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSettings {
    #[serde(default = "default_login_url")]
    pub url: String,
}

fn default_login_url() -> String {
    DEFAULT_LOGIN_URL.to_string()
}

impl Default for LoginSettings {
    fn default() -> Self {
        Self {
            url: default_login_url(),
        }
    }
}

fn default_migrations() -> Vec<ColumnMapping> {
    vec![ColumnMapping::payments()]
}

/// Operator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub hashing: HashingConfig,
    #[serde(default = "default_migrations")]
    pub migrations: Vec<ColumnMapping>,
    #[serde(default)]
    pub login: LoginSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseSettings::default(),
            hashing: HashingConfig::default(),
            migrations: default_migrations(),
            login: LoginSettings::default(),
        }
    }
}

impl Config {
    /// Load config from the operator directory
    ///
    /// Database paths can be overridden with CLIENTOPS_APP_DB and
    /// CLIENTOPS_LEGACY_DB. A settings file that does not parse is an error.
    pub fn load(ops_dir: &Path) -> Result<Self> {
        let settings_path = ops_dir.join(SETTINGS_FILE);

        let mut config: Config = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).map_err(|e| {
                Error::configuration(format!("{}: {}", settings_path.display(), e))
            })?
        } else {
            Config::default()
        };

        if let Ok(path) = std::env::var("CLIENTOPS_APP_DB") {
            config.database.app_db = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("CLIENTOPS_LEGACY_DB") {
            config.database.legacy_db = PathBuf::from(path);
        }

        config.database.app_db = resolve(ops_dir, &config.database.app_db);
        config.database.legacy_db = resolve(ops_dir, &config.database.legacy_db);

        Ok(config)
    }

    /// Save config to the operator directory
    pub fn save(&self, ops_dir: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(ops_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
