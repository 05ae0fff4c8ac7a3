//! Terminal outcomes of the registration and authentication flows.
//!
//! A flow ends either in success or in one `FlowError`. `Rejected` outcomes are
//! caused by the client and carry no infrastructure detail. `Failed` outcomes
//! keep their underlying error as `source` so it can be logged, but only the
//! step message ever reaches the caller.

use thiserror::Error;

/// Client-caused outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("All fields are required")]
    MissingFields,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Password must be at least 8 characters")]
    WeakSecret,
    #[error("User already exists with this email")]
    DuplicateAccount,
    #[error("User not found")]
    UnknownAccount,
    #[error("Invalid credentials")]
    BadCredentials,
}

/// Infrastructure-caused outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Failure {
    #[error("store error")]
    Store,
    #[error("hashing error")]
    Hashing,
    #[error("verification error")]
    Verification,
    #[error("token error")]
    Token,
    #[error("timeout")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("{0}")]
    Rejected(Rejection),

    #[error("{message}")]
    Failed {
        kind: Failure,
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl FlowError {
    pub(crate) fn failed(
        kind: Failure,
        message: &'static str,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Failed {
            kind,
            message,
            source: source.into(),
        }
    }

    #[must_use]
    pub const fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Rejected(rejection) => Some(*rejection),
            Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub const fn failure(&self) -> Option<Failure> {
        match self {
            Self::Rejected(_) => None,
            Self::Failed { kind, .. } => Some(*kind),
        }
    }
}

impl From<Rejection> for FlowError {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}
