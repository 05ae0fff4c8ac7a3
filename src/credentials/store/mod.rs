//! Persistence boundary for accounts.
//!
//! Email uniqueness belongs to the store: `create` must refuse a duplicate
//! atomically, whatever lookups the caller performed beforehand.

pub mod memory;
pub mod postgres;

pub use self::memory::MemoryCredentialStore;
pub use self::postgres::PgCredentialStore;

use crate::credentials::{account::Account, hasher::HashedSecret};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account already exists")]
    AlreadyExists,
    #[error("credential store unavailable")]
    Unavailable(#[source] anyhow::Error),
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive lookup by email.
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` on infrastructure failure.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Insert a new account and return it with its assigned id.
    ///
    /// # Errors
    /// Returns `StoreError::AlreadyExists` if the email is taken and
    /// `StoreError::Unavailable` on infrastructure failure.
    async fn create(
        &self,
        name: &str,
        email: &str,
        secret_hash: &HashedSecret,
    ) -> Result<Account, StoreError>;
}
