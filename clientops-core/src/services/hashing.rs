//! Password hashing - bcrypt or Argon2id, chosen in settings

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::Rng;

use crate::domain::result::{Error, Result};
use crate::domain::{HashScheme, HashingConfig};

/// Hashes and verifies passwords under one configured scheme
#[derive(Debug, Clone)]
pub struct PasswordHashing {
    config: HashingConfig,
}

impl PasswordHashing {
    /// Build a hasher, rejecting cost factors the scheme cannot use
    pub fn new(config: HashingConfig) -> Result<Self> {
        match config.scheme {
            HashScheme::Bcrypt => {
                if !(4..=31).contains(&config.bcrypt_cost) {
                    return Err(Error::configuration(format!(
                        "bcrypt cost must be between 4 and 31, got {}",
                        config.bcrypt_cost
                    )));
                }
            }
            HashScheme::Argon2id => {
                Self::argon2_params(&config)?;
            }
        }
        Ok(Self { config })
    }

    pub fn scheme(&self) -> HashScheme {
        self.config.scheme
    }

    fn argon2_params(config: &HashingConfig) -> Result<argon2::Params> {
        argon2::Params::new(
            config.argon2.memory_cost,
            config.argon2.time_cost,
            config.argon2.parallelism,
            None,
        )
        .map_err(|e| Error::configuration(format!("invalid argon2 parameters: {}", e)))
    }

    fn fresh_salt() -> [u8; 16] {
        rand::thread_rng().gen()
    }

    /// Hash `plaintext` with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        match self.config.scheme {
            HashScheme::Bcrypt => {
                let parts =
                    bcrypt::hash_with_salt(plaintext, self.config.bcrypt_cost, Self::fresh_salt())
                        .map_err(|e| Error::Hashing(e.to_string()))?;
                Ok(parts.format_for_version(bcrypt::Version::TwoB))
            }
            HashScheme::Argon2id => {
                let params = Self::argon2_params(&self.config)?;
                let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
                let salt = SaltString::encode_b64(&Self::fresh_salt())
                    .map_err(|e| Error::Hashing(e.to_string()))?;
                let hash = argon2
                    .hash_password(plaintext.as_bytes(), &salt)
                    .map_err(|e| Error::Hashing(e.to_string()))?;
                Ok(hash.to_string())
            }
        }
    }

    /// Constant-time check of `plaintext` against a stored hash
    ///
    /// A hash the scheme cannot parse never verifies.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        match self.config.scheme {
            HashScheme::Bcrypt => bcrypt::verify(plaintext, stored_hash).unwrap_or(false),
            HashScheme::Argon2id => match PasswordHash::new(stored_hash) {
                Ok(parsed) => Argon2::default()
                    .verify_password(plaintext.as_bytes(), &parsed)
                    .is_ok(),
                Err(_) => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Argon2Params;

    fn bcrypt_fast() -> PasswordHashing {
        PasswordHashing::new(HashingConfig::bcrypt(4)).unwrap()
    }

    fn argon2_fast() -> PasswordHashing {
        PasswordHashing::new(HashingConfig::argon2id(Argon2Params {
            time_cost: 1,
            memory_cost: 1024,
            parallelism: 1,
        }))
        .unwrap()
    }

    #[test]
    fn test_bcrypt_hash_verifies() {
        let hashing = bcrypt_fast();
        let hash = hashing.hash("password").unwrap();
        assert!(hash.starts_with("$2b$04$"));
        assert!(hashing.verify("password", &hash));
        assert!(!hashing.verify("Password", &hash));
    }

    #[test]
    fn test_bcrypt_salts_differ() {
        let hashing = bcrypt_fast();
        let a = hashing.hash("password").unwrap();
        let b = hashing.hash("password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_argon2_hash_verifies() {
        let hashing = argon2_fast();
        let hash = hashing.hash("password").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hashing.verify("password", &hash));
        assert!(!hashing.verify("wrong", &hash));
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        for hashing in [bcrypt_fast(), argon2_fast()] {
            assert!(!hashing.verify("password", ""));
            assert!(!hashing.verify("password", "password"));
            assert!(!hashing.verify("password", "$2b$12$truncated"));
        }
    }

    #[test]
    fn test_other_scheme_hash_does_not_verify() {
        let bcrypt_hash = bcrypt_fast().hash("password").unwrap();
        let argon2_hash = argon2_fast().hash("password").unwrap();

        assert!(!argon2_fast().verify("password", &bcrypt_hash));
        assert!(!bcrypt_fast().verify("password", &argon2_hash));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        assert!(matches!(
            PasswordHashing::new(HashingConfig::bcrypt(3)),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            PasswordHashing::new(HashingConfig::argon2id(Argon2Params {
                time_cost: 0,
                memory_cost: 1024,
                parallelism: 1,
            })),
            Err(Error::Configuration(_))
        ));
    }
}
