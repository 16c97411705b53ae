//! Member signup endpoint.

use axum::{extract::Extension, Json};
use std::sync::Arc;
use tracing::instrument;

use super::types::SignupRequest;
use super::missing_payload;
use crate::api::envelope::{ErrorEnvelope, ResponseEnvelope};
use crate::auth::{AuthError, AuthService};

const SIGNUP_SUCCEEDED: &str = "signup succeeded";

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Member registered", body = ResponseEnvelope<String>),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Identifier already registered", body = ErrorEnvelope),
        (status = 500, description = "Unexpected error", body = ErrorEnvelope)
    ),
    tag = "auth"
)]
#[instrument(skip(service, payload))]
pub async fn signup(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<SignupRequest>>,
) -> Result<Json<ResponseEnvelope<String>>, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(missing_payload());
    };

    let (profile, credential) = request.into_parts();
    service.signup(profile, credential).await?;

    Ok(Json(ResponseEnvelope::success(
        SIGNUP_SUCCEEDED,
        SIGNUP_SUCCEEDED.to_string(),
    )))
}
