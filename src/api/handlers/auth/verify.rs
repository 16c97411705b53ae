//! Access token verification endpoint.

use axum::{extract::Extension, Json};
use std::sync::Arc;
use tracing::instrument;

use super::missing_payload;
use super::types::{VerifyRequest, TOKEN_VALID};
use crate::api::envelope::{ErrorEnvelope, ResponseEnvelope};
use crate::auth::{AuthError, AuthService, TokenKind};

#[utoipa::path(
    post,
    path = "/api/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Token valid and member authorized", body = ResponseEnvelope<i32>),
        (status = 400, description = "Member not resolvable", body = ErrorEnvelope),
        (status = 401, description = "Invalid, expired or malformed token", body = ErrorEnvelope),
        (status = 403, description = "Member not authorized", body = ErrorEnvelope),
        (status = 500, description = "Unexpected error", body = ErrorEnvelope)
    ),
    tag = "auth"
)]
#[instrument(skip(service, payload))]
pub async fn verify(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<VerifyRequest>>,
) -> Result<Json<ResponseEnvelope<i32>>, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(missing_payload());
    };

    // Token validity and member resolution are checked independently.
    service.issuer().verify_access(&request.access_token)?;
    let member = service
        .resolve_member(&request.access_token, TokenKind::Access)
        .await?;

    if !service.validate_member_access(&member) {
        return Err(AuthError::Forbidden);
    }

    Ok(Json(ResponseEnvelope::success("token verified", TOKEN_VALID)))
}
