//! The one place where `AuthError` becomes an HTTP status.
//!
//! Every route returns `Result<_, AuthError>`, so the mapping below applies
//! identically everywhere.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

use super::envelope::ErrorEnvelope;
use crate::auth::AuthError;

pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[must_use]
pub fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidRequest(_) | AuthError::InvalidCredential | AuthError::MemberNotFound => {
            StatusCode::BAD_REQUEST
        }
        AuthError::Forbidden => StatusCode::FORBIDDEN,
        AuthError::DuplicateIdentifier
        | AuthError::InvalidToken
        | AuthError::ExpiredToken
        | AuthError::MalformedToken
        | AuthError::RevokedToken => StatusCode::UNAUTHORIZED,
        AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[must_use]
pub fn envelope_for(err: &AuthError) -> ErrorEnvelope {
    match err {
        AuthError::Internal(_) => ErrorEnvelope::new(err.code(), INTERNAL_ERROR_MESSAGE),
        _ => ErrorEnvelope::new(err.code(), err.to_string()),
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        match &self {
            AuthError::Internal(inner) => error!("request failed: {inner:#}"),
            other if other.is_token_error() => debug!("token rejected: {other}"),
            other => debug!("request rejected: {other}"),
        }
        (status, Json(envelope_for(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn mapping_matches_categories() {
        assert_eq!(
            status_for(&AuthError::InvalidCredential),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AuthError::MemberNotFound),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&AuthError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&AuthError::DuplicateIdentifier),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&AuthError::ExpiredToken),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&AuthError::Internal(anyhow!("db down"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_do_not_leak() {
        let envelope = envelope_for(&AuthError::Internal(anyhow!("password for db is hunter2")));
        assert_eq!(envelope.code, 0);
        assert_eq!(envelope.message, INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn domain_errors_carry_code_and_message() {
        let envelope = envelope_for(&AuthError::RevokedToken);
        assert_eq!(envelope.code, 2004);
        assert_eq!(envelope.message, "token revoked");
    }
}
