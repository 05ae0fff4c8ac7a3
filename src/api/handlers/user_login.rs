use crate::{
    api::handlers::{error_response, AccessToken, ErrorBody, ErrorPolicy},
    credentials::{CredentialService, Login},
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
pub struct UserLogin {
    email: Option<String>,
    password: Option<String>,
}

#[utoipa::path(
    post,
    path = "/user/login",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Login successful", body = AccessToken, content_type = "application/json"),
        (status = 400, description = "Missing fields", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Store, verification or signing failure", body = ErrorBody),
    ),
    tag = "login"
)]
// axum handler for login
#[instrument(skip_all)]
pub async fn login(
    service: Extension<Arc<CredentialService>>,
    policy: Extension<ErrorPolicy>,
    payload: Option<Json<UserLogin>>,
) -> Response {
    let user = payload.map(|Json(payload)| payload).unwrap_or_default();

    let login = Login::new(
        user.email.unwrap_or_default(),
        user.password.unwrap_or_default(),
    );

    match service.authenticate(login).await {
        Ok(issued) => (
            StatusCode::OK,
            Json(AccessToken::new(issued.access_token, "Login successful")),
        )
            .into_response(),
        Err(e) => error_response(&e, &policy),
    }
}
