//! Login endpoint: checks credentials and issues a token pair.

use axum::{extract::Extension, Json};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::instrument;

use super::missing_payload;
use super::types::LoginRequest;
use crate::api::envelope::{ErrorEnvelope, ResponseEnvelope};
use crate::auth::{AuthError, AuthService, TokenPair};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = ResponseEnvelope<TokenPair>),
        (status = 400, description = "Invalid credential", body = ErrorEnvelope),
        (status = 401, description = "Authentication error", body = ErrorEnvelope),
        (status = 500, description = "Unexpected error", body = ErrorEnvelope)
    ),
    tag = "auth"
)]
#[instrument(skip(service, payload))]
pub async fn login(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Json<ResponseEnvelope<TokenPair>>, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(missing_payload());
    };

    let member = service
        .login(&request.user_id, SecretString::from(request.password))
        .await?
        .ok_or(AuthError::InvalidCredential)?;

    let pair = service.issue_tokens(&member)?;

    Ok(Json(ResponseEnvelope::success("login succeeded", pair)))
}
