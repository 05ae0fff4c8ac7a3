use crate::{
    api::handlers::ErrorPolicy,
    credentials::{BcryptHasher, CredentialService, CredentialStore, JwtIssuer},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{fmt, str::FromStr, sync::Arc, time::Duration};

/// Deployment mode, controls how much error detail reaches clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            _ => Err(format!("invalid environment: {s}")),
        }
    }
}

/// Settings fixed at process start and shared read-only afterwards.
#[derive(Clone)]
pub struct GlobalArgs {
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: i64,
    pub hash_cost: u32,
    pub call_timeout: Option<Duration>,
    pub environment: Environment,
    pub frontend_origin: Option<String>,
    pub conceal_unknown_accounts: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(jwt_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            token_ttl_seconds: crate::credentials::token::DEFAULT_TOKEN_TTL_SECONDS,
            hash_cost: crate::credentials::hasher::DEFAULT_HASH_COST,
            call_timeout: Some(Duration::from_secs(10)),
            environment: Environment::default(),
            frontend_origin: None,
            conceal_unknown_accounts: false,
        }
    }

    /// Wire the credential flows to `store` using these settings.
    ///
    /// # Errors
    /// Returns an error if the signing key or token lifetime is unusable.
    pub fn credential_service(&self, store: Arc<dyn CredentialStore>) -> Result<CredentialService> {
        let issuer = JwtIssuer::new(&self.jwt_secret, self.token_ttl_seconds)
            .context("Invalid token settings")?;

        Ok(CredentialService::new(
            store,
            Arc::new(BcryptHasher::new(self.hash_cost)),
            Arc::new(issuer),
        )
        .with_call_timeout(self.call_timeout))
    }

    #[must_use]
    pub fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy {
            expose_stack: self.environment == Environment::Development,
            conceal_unknown_accounts: self.conceal_unknown_accounts,
        }
    }
}

impl fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("jwt_secret", &"***")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("hash_cost", &self.hash_cost)
            .field("call_timeout", &self.call_timeout)
            .field("environment", &self.environment)
            .field("frontend_origin", &self.frontend_origin)
            .field("conceal_unknown_accounts", &self.conceal_unknown_accounts)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(SecretString::from("signing-key"));
        assert_eq!(args.jwt_secret.expose_secret(), "signing-key");
        assert_eq!(args.token_ttl_seconds, 604_800);
        assert_eq!(args.hash_cost, 10);
        assert_eq!(args.environment, Environment::Production);
        assert!(!format!("{args:?}").contains("signing-key"));
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(
            "development".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        // only the values `--env` accepts
        for other in ["staging", "dev", "prod", "Production"] {
            assert!(other.parse::<Environment>().is_err(), "{other}");
        }
    }

    #[test]
    fn test_error_policy() {
        let mut args = GlobalArgs::new(SecretString::from("signing-key"));
        assert!(!args.error_policy().expose_stack);

        args.environment = Environment::Development;
        args.conceal_unknown_accounts = true;
        let policy = args.error_policy();
        assert!(policy.expose_stack);
        assert!(policy.conceal_unknown_accounts);
    }

    #[test]
    fn test_credential_service_requires_key() {
        let store = Arc::new(MemoryCredentialStore::new());
        let args = GlobalArgs::new(SecretString::from(""));
        assert!(args.credential_service(store.clone()).is_err());

        let args = GlobalArgs::new(SecretString::from("signing-key"));
        assert!(args.credential_service(store).is_ok());
    }
}
