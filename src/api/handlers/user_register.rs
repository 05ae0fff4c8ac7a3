use crate::{
    api::handlers::{error_response, AccessToken, ErrorBody, ErrorPolicy},
    credentials::{CredentialService, Registration},
};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Default)]
pub struct UserRegister {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[utoipa::path(
    post,
    path = "/user/register",
    request_body = UserRegister,
    responses (
        (status = 201, description = "User created successfully", body = AccessToken, content_type = "application/json"),
        (status = 400, description = "Missing fields, invalid email or weak password", body = ErrorBody),
        (status = 409, description = "User with the specified email already exists", body = ErrorBody),
        (status = 500, description = "Store, hashing or signing failure", body = ErrorBody),
    ),
    tag = "register"
)]
// axum handler for register
#[instrument(skip_all)]
pub async fn register(
    service: Extension<Arc<CredentialService>>,
    policy: Extension<ErrorPolicy>,
    payload: Option<Json<UserRegister>>,
) -> Response {
    // an absent or unparsable body counts as all fields missing
    let user = payload.map(|Json(payload)| payload).unwrap_or_default();

    let registration = Registration::new(
        user.name.unwrap_or_default(),
        user.email.unwrap_or_default(),
        user.password.unwrap_or_default(),
    );

    match service.register(registration).await {
        Ok(issued) => (
            StatusCode::CREATED,
            Json(AccessToken::new(
                issued.access_token,
                "User created successfully",
            )),
        )
            .into_response(),
        Err(e) => error_response(&e, &policy),
    }
}
