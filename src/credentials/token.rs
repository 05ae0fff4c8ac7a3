//! Access token issuance and verification (HS256 JWT).
//!
//! Tokens carry `sub` (the account id), `iat` and `exp`. They are stateless:
//! anything holding the signing key can check them without calling back.

use crate::credentials::account::AccountId;
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default token lifetime: 7 days.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing key is missing")]
    MissingKey,
    #[error("invalid token ttl")]
    InvalidTtl,
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("invalid signature")]
    BadSignature,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub trait TokenIssuer: Send + Sync {
    /// Sign a token for `subject`, valid from now for the configured lifetime.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    fn issue(&self, subject: &AccountId) -> Result<String, TokenError>;

    /// Check signature and expiry, returning the subject.
    ///
    /// # Errors
    /// Returns `Expired`, `Malformed` or `BadSignature`.
    fn verify(&self, token: &str) -> Result<AccountId, TokenError>;
}

fn now_unix_seconds() -> i64 {
    Utc::now().timestamp()
}

#[derive(Clone)]
pub struct JwtIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl JwtIssuer {
    /// # Errors
    /// Returns `MissingKey` for an empty secret and `InvalidTtl` for a
    /// non-positive lifetime.
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Result<Self, TokenError> {
        let key = secret.expose_secret();
        if key.is_empty() {
            return Err(TokenError::MissingKey);
        }
        if ttl_seconds <= 0 {
            return Err(TokenError::InvalidTtl);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            ttl_seconds,
        })
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    /// Returns an error if the expiry overflows or signing fails.
    pub fn issue_at(&self, subject: &AccountId, now: i64) -> Result<String, TokenError> {
        let exp = now
            .checked_add(self.ttl_seconds)
            .ok_or(TokenError::InvalidTtl)?;

        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// Expiry is exact: the token is accepted strictly before `exp`.
    ///
    /// # Errors
    /// Returns `Expired`, `Malformed` or `BadSignature`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is checked below against the caller's clock
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        if data.claims.exp <= now {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, subject: &AccountId) -> Result<String, TokenError> {
        self.issue_at(subject, now_unix_seconds())
    }

    fn verify(&self, token: &str) -> Result<AccountId, TokenError> {
        let claims = self.verify_at(token, now_unix_seconds())?;
        claims.sub.parse().map_err(|_| TokenError::Malformed)
    }
}

impl fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtIssuer")
            .field("key", &"***")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}
