pub mod health;
pub use self::health::health;

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

// common types and functions for the handlers
use crate::credentials::{Failure, FlowError, Rejection};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::error::Error as StdError;
use tracing::info;
use utoipa::ToSchema;

/// Successful register/login body.
#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    access_token: String,
    message: String,
}

impl AccessToken {
    pub(crate) fn new(access_token: String, message: &str) -> Self {
        Self {
            access_token,
            message: message.to_string(),
        }
    }
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    message: String,
    /// Error chain in development mode, empty otherwise.
    error_stack: String,
}

/// How flow errors are presented to clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorPolicy {
    /// Include the error chain in `errorStack`.
    pub expose_stack: bool,
    /// Report unknown accounts as bad credentials.
    pub conceal_unknown_accounts: bool,
}

impl ErrorPolicy {
    #[must_use]
    pub fn outward(&self, rejection: Rejection) -> Rejection {
        if self.conceal_unknown_accounts && rejection == Rejection::UnknownAccount {
            info!("unknown account reported as bad credentials");
            return Rejection::BadCredentials;
        }
        rejection
    }
}

const fn rejection_status(rejection: Rejection) -> StatusCode {
    match rejection {
        Rejection::MissingFields | Rejection::InvalidEmail | Rejection::WeakSecret => {
            StatusCode::BAD_REQUEST
        }
        Rejection::DuplicateAccount => StatusCode::CONFLICT,
        Rejection::UnknownAccount => StatusCode::NOT_FOUND,
        Rejection::BadCredentials => StatusCode::UNAUTHORIZED,
    }
}

const fn failure_status(failure: Failure) -> StatusCode {
    match failure {
        Failure::Timeout => StatusCode::GATEWAY_TIMEOUT,
        Failure::Store | Failure::Hashing | Failure::Verification | Failure::Token => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_chain(err: &dyn StdError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str("\ncaused by: ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// Translate a flow error into the `{message, errorStack}` response.
#[must_use]
pub fn error_response(err: &FlowError, policy: &ErrorPolicy) -> Response {
    let (status, message) = match err {
        FlowError::Rejected(rejection) => {
            let rejection = policy.outward(*rejection);
            (rejection_status(rejection), rejection.to_string())
        }
        FlowError::Failed { kind, message, .. } => (failure_status(*kind), (*message).to_string()),
    };

    let error_stack = if policy.expose_stack {
        error_chain(err)
    } else {
        String::new()
    };

    (
        status,
        Json(ErrorBody {
            message,
            error_stack,
        }),
    )
        .into_response()
}

// axum handler for the root path
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Welcome" }))
}
