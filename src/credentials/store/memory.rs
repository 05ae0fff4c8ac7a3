use super::{CredentialStore, StoreError};
use crate::credentials::{
    account::{Account, AccountId},
    hasher::HashedSecret,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process store keyed by email.
///
/// The existence check and the insert in `create` happen under one write
/// lock, which plays the role of a unique index.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().await.get(email).cloned())
    }

    async fn create(
        &self,
        name: &str,
        email: &str,
        secret_hash: &HashedSecret,
    ) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().await;

        if accounts.contains_key(email) {
            return Err(StoreError::AlreadyExists);
        }

        let account = Account {
            id: AccountId::new_random(),
            name: name.to_string(),
            email: email.to_string(),
            secret_hash: secret_hash.clone(),
        };
        accounts.insert(email.to_string(), account.clone());

        Ok(account)
    }
}
