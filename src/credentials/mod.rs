//! Credential issuance: account registration and authentication.
//!
//! Both flows are linear sequences of steps. Every step returns a `Result`
//! and any error is translated into a `FlowError` right where it happens, so
//! a flow either completes with an `Issued` token or stops at the first
//! failing step.
//!
//! The service owns no mutable state. Duplicate registrations racing each
//! other are settled by the store's unique constraint; the lookup performed
//! before hashing only fails fast in the common case.

pub mod account;
pub mod authenticate;
pub mod error;
pub mod hasher;
pub mod register;
pub mod store;
pub mod token;
pub mod validate;

pub use self::{
    account::{Account, AccountId},
    authenticate::Login,
    error::{Failure, FlowError, Rejection},
    hasher::{BcryptHasher, HashError, HashedSecret, SecretHasher},
    register::Registration,
    store::{CredentialStore, MemoryCredentialStore, PgCredentialStore, StoreError},
    token::{JwtIssuer, TokenError, TokenIssuer},
};

use secrecy::{ExposeSecret, SecretString};
use std::{fmt, future::Future, sync::Arc, time::Duration};
use tokio::{task, time::timeout};
use tracing::error;

/// Successful outcome of either flow.
#[derive(Debug, Clone)]
pub struct Issued {
    pub account_id: AccountId,
    pub access_token: String,
}

#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn SecretHasher>,
    issuer: Arc<dyn TokenIssuer>,
    call_timeout: Option<Duration>,
}

impl CredentialService {
    #[must_use]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn SecretHasher>,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
            call_timeout: None,
        }
    }

    /// Bound every store and hashing call; `None` waits indefinitely.
    #[must_use]
    pub const fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &Arc<dyn TokenIssuer> {
        &self.issuer
    }

    async fn bounded<T, F>(&self, step: &'static str, call: F) -> Result<T, FlowError>
    where
        F: Future<Output = Result<T, FlowError>>,
    {
        match self.call_timeout {
            Some(limit) => timeout(limit, call).await.map_err(|elapsed| {
                error!("{step} timed out after {limit:?}");
                FlowError::failed(
                    Failure::Timeout,
                    "Request timed out",
                    anyhow::Error::new(elapsed).context(step),
                )
            })?,
            None => call.await,
        }
    }

    /// Hash on the blocking pool; bcrypt would otherwise stall the executor.
    async fn hash_secret(&self, secret: SecretString) -> Result<HashedSecret, FlowError> {
        let hasher = self.hasher.clone();
        let message = "Error hashing password";

        self.bounded("hash secret", async move {
            let hashed = task::spawn_blocking(move || hasher.hash(secret.expose_secret()))
                .await
                .map_err(anyhow::Error::new)
                .and_then(|result| result.map_err(anyhow::Error::new));

            hashed.map_err(|e| {
                error!("{message}: {e:?}");
                FlowError::failed(Failure::Hashing, message, e)
            })
        })
        .await
    }

    async fn verify_secret(
        &self,
        secret: SecretString,
        hashed: HashedSecret,
    ) -> Result<bool, FlowError> {
        let hasher = self.hasher.clone();
        let message = "Error during password validation";

        self.bounded("verify secret", async move {
            let matches =
                task::spawn_blocking(move || hasher.verify(secret.expose_secret(), &hashed))
                    .await
                    .map_err(anyhow::Error::new)
                    .and_then(|result| result.map_err(anyhow::Error::new));

            matches.map_err(|e| {
                error!("{message}: {e:?}");
                FlowError::failed(Failure::Verification, message, e)
            })
        })
        .await
    }

    async fn lookup(
        &self,
        email: &str,
        message: &'static str,
    ) -> Result<Option<Account>, FlowError> {
        self.bounded("lookup account", async {
            self.store
                .find_by_email(email)
                .await
                .map_err(|e| {
                    error!("{message}: {e:?}");
                    FlowError::failed(Failure::Store, message, e)
                })
        })
        .await
    }

    fn issue_token(
        &self,
        subject: &AccountId,
        message: &'static str,
    ) -> Result<String, FlowError> {
        self.issuer.issue(subject).map_err(|e| {
            error!("{message}: {e:?}");
            FlowError::failed(Failure::Token, message, e)
        })
    }
}

impl fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialService")
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}
