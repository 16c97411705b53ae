//! Auth endpoints.
//!
//! Each handler validates the body, makes one orchestration call and returns
//! `Result<_, AuthError>`; status translation lives in `api::error`.

pub mod login;
pub mod refresh;
pub mod signup;
pub mod types;
pub mod verify;

use crate::auth::AuthError;

fn missing_payload() -> AuthError {
    AuthError::InvalidRequest("missing or invalid payload".to_string())
}
