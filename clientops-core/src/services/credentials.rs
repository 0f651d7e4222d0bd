//! Credential verifier - checks a known password and repairs its stored hash

use std::path::Path;

use serde::Serialize;

use crate::adapters::duckdb::DuckDbStore;
use crate::domain::result::{Error, Result};
use crate::ports::UserStore;

use super::hashing::PasswordHashing;

/// Terminal outcome of a successful check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// Stored hash already matched; nothing was written
    Verified,
    /// Stored hash was replaced by `new_hash`
    Repaired { new_hash: String },
}

/// Restores "the stored hash verifies the expected password" for one user
pub struct CredentialVerifier {
    hashing: PasswordHashing,
}

impl CredentialVerifier {
    pub fn new(hashing: PasswordHashing) -> Self {
        Self { hashing }
    }

    /// Verify `expected_plaintext` against the user's stored hash, rehashing on failure
    ///
    /// At most one row is updated. An unparseable stored hash is treated the
    /// same as a mismatch.
    pub fn verify_and_repair(
        &self,
        store: &impl UserStore,
        username: &str,
        expected_plaintext: &str,
    ) -> Result<VerifyOutcome> {
        if username.trim().is_empty() {
            return Err(Error::validation("username must not be empty"));
        }

        let stored_hash = store
            .find_password_hash(username)?
            .ok_or_else(|| Error::UserNotFound(username.to_string()))?;

        if self.hashing.verify(expected_plaintext, &stored_hash) {
            return Ok(VerifyOutcome::Verified);
        }

        let new_hash = self.hashing.hash(expected_plaintext)?;
        let updated = store.update_password_hash(username, &new_hash)?;
        if updated == 0 {
            // Row disappeared between the lookup and the update
            return Err(Error::UserNotFound(username.to_string()));
        }

        Ok(VerifyOutcome::Repaired { new_hash })
    }

    /// Same as [`verify_and_repair`](Self::verify_and_repair) against a database file
    ///
    /// The connection lives only for this call.
    pub fn verify_and_repair_at(
        &self,
        db_path: &Path,
        username: &str,
        expected_plaintext: &str,
    ) -> Result<VerifyOutcome> {
        if username.trim().is_empty() {
            return Err(Error::validation("username must not be empty"));
        }
        let store = DuckDbStore::open_existing(db_path)?;
        self.verify_and_repair(&store, username, expected_plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use crate::domain::HashingConfig;

    /// In-memory user table that counts writes
    #[derive(Default)]
    struct MemoryUsers {
        users: RefCell<HashMap<String, String>>,
        writes: Cell<usize>,
    }

    impl MemoryUsers {
        fn with(username: &str, hash: &str) -> Self {
            let store = Self::default();
            store.users.borrow_mut().insert(username.to_string(), hash.to_string());
            store
        }
    }

    impl UserStore for MemoryUsers {
        fn find_password_hash(&self, username: &str) -> Result<Option<String>> {
            Ok(self.users.borrow().get(username).cloned())
        }

        fn update_password_hash(&self, username: &str, password_hash: &str) -> Result<usize> {
            self.writes.set(self.writes.get() + 1);
            match self.users.borrow_mut().get_mut(username) {
                Some(hash) => {
                    *hash = password_hash.to_string();
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }

    /// Store whose connection is gone
    struct UnreachableStore;

    impl UserStore for UnreachableStore {
        fn find_password_hash(&self, _username: &str) -> Result<Option<String>> {
            Err(Error::store("connection refused"))
        }

        fn update_password_hash(&self, _username: &str, _password_hash: &str) -> Result<usize> {
            panic!("update must not be reached");
        }
    }

    fn verifier() -> CredentialVerifier {
        CredentialVerifier::new(PasswordHashing::new(HashingConfig::bcrypt(4)).unwrap())
    }

    #[test]
    fn test_matching_hash_is_verified_without_writes() {
        let v = verifier();
        let hash = bcrypt::hash("password", 4).unwrap();
        let store = MemoryUsers::with("admin", &hash);

        let outcome = v.verify_and_repair(&store, "admin", "password").unwrap();

        assert_eq!(outcome, VerifyOutcome::Verified);
        assert_eq!(store.writes.get(), 0);
        assert_eq!(store.users.borrow()["admin"], hash);
    }

    #[test]
    fn test_mismatch_is_repaired_once() {
        let v = verifier();
        let store = MemoryUsers::with("admin", &bcrypt::hash("other", 4).unwrap());

        let outcome = v.verify_and_repair(&store, "admin", "password").unwrap();

        let VerifyOutcome::Repaired { new_hash } = outcome else {
            panic!("expected repair, got {:?}", outcome);
        };
        assert_eq!(store.writes.get(), 1);
        assert_eq!(store.users.borrow()["admin"], new_hash);
        assert!(bcrypt::verify("password", &new_hash).unwrap());

        // Second run finds a valid hash
        let outcome = v.verify_and_repair(&store, "admin", "password").unwrap();
        assert_eq!(outcome, VerifyOutcome::Verified);
        assert_eq!(store.writes.get(), 1);
    }

    #[test]
    fn test_malformed_hash_is_repaired() {
        let v = verifier();
        let store = MemoryUsers::with("admin", "plaintext-password");

        let outcome = v.verify_and_repair(&store, "admin", "password").unwrap();

        assert!(matches!(outcome, VerifyOutcome::Repaired { .. }));
        assert_eq!(store.writes.get(), 1);
    }

    #[test]
    fn test_missing_user_is_reported_without_writes() {
        let v = verifier();
        let store = MemoryUsers::with("admin", "x");

        let err = v.verify_and_repair(&store, "ghost", "password").unwrap_err();

        assert!(matches!(err, Error::UserNotFound(ref u) if u == "ghost"));
        assert_eq!(store.writes.get(), 0);
        assert_eq!(store.users.borrow().len(), 1);
    }

    #[test]
    fn test_empty_username_rejected_before_io() {
        let err = verifier()
            .verify_and_repair(&UnreachableStore, "  ", "password")
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_store_failure_propagates() {
        let err = verifier()
            .verify_and_repair(&UnreachableStore, "admin", "password")
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[test]
    fn test_outcome_serialization_tags_status() {
        let json = serde_json::to_value(VerifyOutcome::Verified).unwrap();
        assert_eq!(json["status"], "verified");

        let json = serde_json::to_value(VerifyOutcome::Repaired { new_hash: "h".into() }).unwrap();
        assert_eq!(json["status"], "repaired");
        assert_eq!(json["new_hash"], "h");
    }
}
