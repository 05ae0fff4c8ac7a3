use crate::credentials::{CredentialService, FlowError, Issued, Rejection};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument};

/// Login input. Absent fields are represented by empty strings.
#[derive(Debug)]
pub struct Login {
    pub email: String,
    pub secret: SecretString,
}

impl Login {
    #[must_use]
    pub fn new(email: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            secret: SecretString::from(secret.into()),
        }
    }
}

impl CredentialService {
    /// Check a returning user's secret and issue a fresh token.
    ///
    /// Unknown emails end in `UnknownAccount` and wrong secrets in
    /// `BadCredentials`; callers decide whether to tell them apart outward.
    ///
    /// # Errors
    /// Returns the `FlowError` of the first step that did not succeed.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, login: Login) -> Result<Issued, FlowError> {
        if login.email.is_empty() || login.secret.expose_secret().is_empty() {
            debug!("login rejected: missing fields");
            return Err(Rejection::MissingFields.into());
        }

        let Some(account) = self.lookup(&login.email, "Database error occurred").await? else {
            debug!("login rejected: unknown account");
            return Err(Rejection::UnknownAccount.into());
        };

        let matches = self
            .verify_secret(login.secret, account.secret_hash)
            .await?;

        if !matches {
            debug!(account_id = %account.id, "login rejected: secret mismatch");
            return Err(Rejection::BadCredentials.into());
        }

        let access_token = self.issue_token(&account.id, "Error generating access token")?;

        info!(account_id = %account.id, "login successful");

        Ok(Issued {
            account_id: account.id,
            access_token,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::credentials::{
        token::DEFAULT_TOKEN_TTL_SECONDS, BcryptHasher, JwtIssuer, MemoryCredentialStore,
        Registration,
    };
    use std::sync::Arc;

    async fn service_with_ann() -> (CredentialService, Issued) {
        let issuer = JwtIssuer::new(
            &SecretString::from("test-signing-key"),
            DEFAULT_TOKEN_TTL_SECONDS,
        )
        .unwrap();
        let service = CredentialService::new(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(BcryptHasher::new(4)),
            Arc::new(issuer),
        );
        let issued = service
            .register(Registration::new("Ann", "ann@x.com", "password1"))
            .await
            .unwrap();
        (service, issued)
    }

    #[tokio::test]
    async fn authenticate_with_correct_secret() {
        let (service, registered) = service_with_ann().await;
        let issued = service
            .authenticate(Login::new("ann@x.com", "password1"))
            .await
            .unwrap();

        assert_eq!(issued.account_id, registered.account_id);
        assert_eq!(
            service.issuer().verify(&issued.access_token).unwrap(),
            registered.account_id
        );
    }

    #[tokio::test]
    async fn authenticate_wrong_secret() {
        let (service, _) = service_with_ann().await;
        let err = service
            .authenticate(Login::new("ann@x.com", "wrongpass"))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::BadCredentials));
    }

    #[tokio::test]
    async fn authenticate_unknown_account() {
        let (service, _) = service_with_ann().await;
        let err = service
            .authenticate(Login::new("ghost@x.com", "whatever"))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::UnknownAccount));
    }

    #[tokio::test]
    async fn authenticate_missing_fields() {
        let (service, _) = service_with_ann().await;
        for (email, secret) in [("", "password1"), ("ann@x.com", ""), ("", "")] {
            let err = service
                .authenticate(Login::new(email, secret))
                .await
                .unwrap_err();
            assert_eq!(err.rejection(), Some(Rejection::MissingFields));
        }
    }

    #[tokio::test]
    async fn authenticate_is_case_sensitive_on_email() {
        let (service, _) = service_with_ann().await;
        let err = service
            .authenticate(Login::new("Ann@x.com", "password1"))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::UnknownAccount));
    }
}
