//! One-way hashing of user secrets.
//!
//! The default implementation is bcrypt: every call draws a fresh salt that is
//! embedded in the output together with the cost, so `verify` needs nothing
//! but the stored string.
//!
//! bcrypt only reads the first 72 bytes of its input. Secrets are therefore
//! reduced to the hex SHA-256 of their full text (64 bytes) before bcrypt sees
//! them, so every byte of a secret takes part in verification.

use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Default bcrypt cost.
pub const DEFAULT_HASH_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("failed to hash secret")]
    Hashing(#[source] bcrypt::BcryptError),
    #[error("failed to verify secret against stored digest")]
    Verification(#[source] bcrypt::BcryptError),
}

/// Stored representation of a secret.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedSecret(String);

impl HashedSecret {
    /// Wrap a digest read back from storage.
    #[must_use]
    pub const fn from_stored(digest: String) -> Self {
        Self(digest)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedSecret(***)")
    }
}

pub trait SecretHasher: Send + Sync {
    /// Produce a salted digest of `secret`.
    ///
    /// # Errors
    /// Returns `HashError::Hashing` if the underlying computation fails.
    fn hash(&self, secret: &str) -> Result<HashedSecret, HashError>;

    /// Check `secret` against `hashed`. A mismatch is `Ok(false)`.
    ///
    /// # Errors
    /// Returns `HashError::Verification` if `hashed` is not a valid digest.
    fn verify(&self, secret: &str, hashed: &HashedSecret) -> Result<bool, HashError>;
}

#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_COST)
    }
}

fn prehash(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl SecretHasher for BcryptHasher {
    fn hash(&self, secret: &str) -> Result<HashedSecret, HashError> {
        bcrypt::hash(prehash(secret), self.cost)
            .map(HashedSecret)
            .map_err(HashError::Hashing)
    }

    fn verify(&self, secret: &str, hashed: &HashedSecret) -> Result<bool, HashError> {
        // bcrypt::verify compares digests in constant time
        bcrypt::verify(prehash(secret), hashed.as_str()).map_err(HashError::Verification)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // lowest cost bcrypt accepts, keeps the tests fast
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_is_not_plaintext() {
        let hasher = BcryptHasher::new(TEST_COST);
        let hashed = hasher.hash("password1").unwrap();
        assert_ne!(hashed.as_str(), "password1");
        assert!(!hashed.as_str().contains("password1"));
    }

    #[test]
    fn hash_is_salted_per_call() {
        let hasher = BcryptHasher::new(TEST_COST);
        let first = hasher.hash("password1").unwrap();
        let second = hasher.hash("password1").unwrap();
        assert_ne!(first, second);
        assert!(hasher.verify("password1", &first).unwrap());
        assert!(hasher.verify("password1", &second).unwrap());
    }

    #[test]
    fn verify_mismatch_is_false() {
        let hasher = BcryptHasher::new(TEST_COST);
        let hashed = hasher.hash("password1").unwrap();
        assert!(!hasher.verify("password2", &hashed).unwrap());
        assert!(!hasher.verify("", &hashed).unwrap());
    }

    #[test]
    fn long_secrets_differ_past_72_bytes() {
        let hasher = BcryptHasher::new(TEST_COST);
        let base = "a".repeat(72);
        let hashed = hasher.hash(&base).unwrap();
        assert!(hasher.verify(&base, &hashed).unwrap());
        assert!(!hasher.verify(&format!("{base}DIFFERENT"), &hashed).unwrap());

        let long = format!("{}correct", "x".repeat(100));
        let hashed = hasher.hash(&long).unwrap();
        assert!(hasher.verify(&long, &hashed).unwrap());
        assert!(!hasher
            .verify(&format!("{}WRONG", "x".repeat(100)), &hashed)
            .unwrap());
    }

    #[test]
    fn verify_malformed_digest_is_error() {
        let hasher = BcryptHasher::default();
        let stored = HashedSecret::from_stored("not-a-bcrypt-digest".to_string());
        assert!(matches!(
            hasher.verify("password1", &stored),
            Err(HashError::Verification(_))
        ));
    }

    #[test]
    fn invalid_cost_is_hashing_error() {
        let hasher = BcryptHasher::new(2);
        assert!(matches!(
            hasher.hash("password1"),
            Err(HashError::Hashing(_))
        ));
    }

    #[test]
    fn debug_does_not_reveal_digest() {
        let hasher = BcryptHasher::new(TEST_COST);
        let hashed = hasher.hash("password1").unwrap();
        assert_eq!(format!("{hashed:?}"), "HashedSecret(***)");
        assert_eq!(hasher.cost(), TEST_COST);
    }
}
