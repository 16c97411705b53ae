//! Domain errors raised by the auth service and token issuer.
//!
//! Every variant carries a stable numeric code. The HTTP layer maps variants
//! to status codes in exactly one place (`api::error`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("identifier already registered")]
    DuplicateIdentifier,
    #[error("invalid credential")]
    InvalidCredential,
    #[error("member not found")]
    MemberNotFound,
    #[error("access denied")]
    Forbidden,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("malformed token")]
    MalformedToken,
    #[error("token revoked")]
    RevokedToken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// Stable error code surfaced in the response envelope; `0` is reserved for
    /// unclassified failures.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::Internal(_) => 0,
            Self::InvalidRequest(_) => 1000,
            Self::DuplicateIdentifier => 1001,
            Self::InvalidCredential => 1002,
            Self::MemberNotFound => 1003,
            Self::Forbidden => 1004,
            Self::InvalidToken => 2001,
            Self::ExpiredToken => 2002,
            Self::MalformedToken => 2003,
            Self::RevokedToken => 2004,
        }
    }

    #[must_use]
    pub const fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken | Self::ExpiredToken | Self::MalformedToken | Self::RevokedToken
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique_and_internal_is_zero() {
        let errors = [
            AuthError::InvalidRequest("x".to_string()),
            AuthError::DuplicateIdentifier,
            AuthError::InvalidCredential,
            AuthError::MemberNotFound,
            AuthError::Forbidden,
            AuthError::InvalidToken,
            AuthError::ExpiredToken,
            AuthError::MalformedToken,
            AuthError::RevokedToken,
        ];
        let codes: HashSet<i32> = errors.iter().map(AuthError::code).collect();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|code| *code > 0));
        assert_eq!(AuthError::Internal(anyhow::anyhow!("boom")).code(), 0);
    }

    #[test]
    fn token_errors_are_classified() {
        assert!(AuthError::ExpiredToken.is_token_error());
        assert!(AuthError::RevokedToken.is_token_error());
        assert!(!AuthError::MemberNotFound.is_token_error());
    }
}
