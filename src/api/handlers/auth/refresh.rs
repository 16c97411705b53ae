//! Refresh endpoint: exchanges a refresh token for a new pair.

use axum::{extract::Extension, Json};
use std::sync::Arc;
use tracing::instrument;

use super::missing_payload;
use super::types::RefreshRequest;
use crate::api::envelope::{ErrorEnvelope, ResponseEnvelope};
use crate::auth::{AuthError, AuthService, TokenPair};

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens refreshed", body = ResponseEnvelope<TokenPair>),
        (status = 400, description = "Member not resolvable", body = ErrorEnvelope),
        (status = 401, description = "Invalid, expired or revoked refresh token", body = ErrorEnvelope),
        (status = 403, description = "Member not authorized", body = ErrorEnvelope),
        (status = 500, description = "Unexpected error", body = ErrorEnvelope)
    ),
    tag = "auth"
)]
#[instrument(skip(service, payload))]
pub async fn refresh(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<RefreshRequest>>,
) -> Result<Json<ResponseEnvelope<TokenPair>>, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(missing_payload());
    };

    let (_member, pair) = service.refresh(&request.refresh_token).await?;

    Ok(Json(ResponseEnvelope::success("token refreshed", pair)))
}
