use crate::credentials::{
    validate::{strong_secret, valid_email},
    Account, CredentialService, Failure, FlowError, HashedSecret, Issued, Rejection, StoreError,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info, instrument};

/// Registration input. Absent fields are represented by empty strings.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub secret: SecretString,
}

impl Registration {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    fn validate(&self) -> Result<(), Rejection> {
        let secret = self.secret.expose_secret();

        if self.name.is_empty() || self.email.is_empty() || secret.is_empty() {
            return Err(Rejection::MissingFields);
        }

        if !valid_email(&self.email) {
            return Err(Rejection::InvalidEmail);
        }

        if !strong_secret(secret) {
            return Err(Rejection::WeakSecret);
        }

        Ok(())
    }
}

impl CredentialService {
    /// Create an account and issue its first token.
    ///
    /// Validate, reject known emails, hash, persist, sign. The account is
    /// written at most once and only after every earlier step succeeded.
    ///
    /// # Errors
    /// Returns the `FlowError` of the first step that did not succeed.
    #[instrument(skip_all)]
    pub async fn register(&self, registration: Registration) -> Result<Issued, FlowError> {
        registration.validate().map_err(|rejection| {
            debug!("registration rejected: {rejection}");
            rejection
        })?;

        // fast path only, the insert below is the real duplicate guard
        if self
            .lookup(&registration.email, "Error checking existing user")
            .await?
            .is_some()
        {
            debug!("email already registered");
            return Err(Rejection::DuplicateAccount.into());
        }

        let Registration {
            name,
            email,
            secret,
        } = registration;

        let secret_hash = self.hash_secret(secret).await?;

        let account = self.persist(&name, &email, &secret_hash).await?;

        let access_token = self.issue_token(&account.id, "Error generating token")?;

        info!(account_id = %account.id, "account registered");

        Ok(Issued {
            account_id: account.id,
            access_token,
        })
    }

    async fn persist(
        &self,
        name: &str,
        email: &str,
        secret_hash: &HashedSecret,
    ) -> Result<Account, FlowError> {
        self.bounded("create account", async {
            match self.store.create(name, email, secret_hash).await {
                Ok(account) => Ok(account),
                Err(StoreError::AlreadyExists) => {
                    debug!("lost registration race, email taken on insert");
                    Err(Rejection::DuplicateAccount.into())
                }
                Err(e) => {
                    error!("Error creating user: {e:?}");
                    Err(FlowError::failed(Failure::Store, "Error creating user", e))
                }
            }
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::credentials::{
        token::DEFAULT_TOKEN_TTL_SECONDS, BcryptHasher, JwtIssuer, MemoryCredentialStore,
        TokenIssuer,
    };
    use crate::credentials::store::CredentialStore;
    use std::sync::Arc;

    fn service() -> (CredentialService, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        let issuer = JwtIssuer::new(
            &SecretString::from("test-signing-key"),
            DEFAULT_TOKEN_TTL_SECONDS,
        )
        .unwrap();
        let service = CredentialService::new(
            store.clone(),
            Arc::new(BcryptHasher::new(4)),
            Arc::new(issuer),
        );
        (service, store)
    }

    fn rejection(result: Result<Issued, FlowError>) -> Rejection {
        result.unwrap_err().rejection().unwrap()
    }

    #[tokio::test]
    async fn register_issues_token_for_new_account() {
        let (service, store) = service();
        let issued = service
            .register(Registration::new("Ann", "ann@x.com", "password1"))
            .await
            .unwrap();

        let account = store.find_by_email("ann@x.com").await.unwrap().unwrap();
        assert_eq!(account.id, issued.account_id);
        assert_eq!(
            service.issuer().verify(&issued.access_token).unwrap(),
            account.id
        );
        assert_ne!(account.secret_hash.as_str(), "password1");
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let (service, store) = service();
        service
            .register(Registration::new("Ann", "ann@x.com", "password1"))
            .await
            .unwrap();

        let result = service
            .register(Registration::new("Ann2", "ann@x.com", "password2"))
            .await;
        assert_eq!(rejection(result), Rejection::DuplicateAccount);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn register_validation_order() {
        let (service, store) = service();

        let cases = [
            (("", "", ""), Rejection::MissingFields),
            (("Ann", "ann@x.com", ""), Rejection::MissingFields),
            (("", "ann@x.com", "password1"), Rejection::MissingFields),
            (("Ann", "abc", "short"), Rejection::InvalidEmail),
            (("Ann", "abc", "password1"), Rejection::InvalidEmail),
            (("Ann", "a@b.com", "1234567"), Rejection::WeakSecret),
        ];

        for ((name, email, secret), expected) in cases {
            let result = service
                .register(Registration::new(name, email, secret))
                .await;
            assert_eq!(rejection(result), expected, "{name:?} {email:?}");
        }

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn register_accepts_boundary_values() {
        let (service, _) = service();
        assert!(service
            .register(Registration::new("A", "a@b.com", "12345678"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn registration_debug_hides_secret() {
        let registration = Registration::new("Ann", "ann@x.com", "password1");
        assert!(!format!("{registration:?}").contains("password1"));
    }
}
