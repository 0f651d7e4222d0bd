//! Password hashing scheme settings

use serde::{Deserialize, Serialize};

/// Default bcrypt cost, same as the application's `bcrypt.gensalt()`
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Default Argon2id parameters
pub const DEFAULT_TIME_COST: u32 = 3;
pub const DEFAULT_MEMORY_COST: u32 = 65536; // 64 MiB
pub const DEFAULT_PARALLELISM: u32 = 4;

/// Adaptive hashing scheme used for `users.password`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashScheme {
    #[default]
    Bcrypt,
    Argon2id,
}

impl HashScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashScheme::Bcrypt => "bcrypt",
            HashScheme::Argon2id => "argon2id",
        }
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argon2Params {
    pub time_cost: u32,
    pub memory_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            time_cost: DEFAULT_TIME_COST,
            memory_cost: DEFAULT_MEMORY_COST,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

/// Scheme plus its cost factors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashingConfig {
    #[serde(default)]
    pub scheme: HashScheme,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    #[serde(default)]
    pub argon2: Argon2Params,
}

fn default_bcrypt_cost() -> u32 {
    DEFAULT_BCRYPT_COST
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            scheme: HashScheme::default(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            argon2: Argon2Params::default(),
        }
    }
}

impl HashingConfig {
    pub fn bcrypt(cost: u32) -> Self {
        Self {
            scheme: HashScheme::Bcrypt,
            bcrypt_cost: cost,
            ..Self::default()
        }
    }

    pub fn argon2id(params: Argon2Params) -> Self {
        Self {
            scheme: HashScheme::Argon2id,
            argon2: params,
            ..Self::default()
        }
    }
}
