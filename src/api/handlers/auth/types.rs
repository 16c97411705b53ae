//! Request/response types for auth endpoints.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Credential, MemberProfile};

/// `data` of a successful verify response.
pub const TOKEN_VALID: i32 = 1;

#[derive(ToSchema, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub user_id: String,
    pub password: String,
    pub user_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl SignupRequest {
    pub(super) fn into_parts(self) -> (MemberProfile, Credential) {
        (
            MemberProfile {
                user_id: self.user_id,
                user_name: self.user_name,
                email: self.email,
            },
            Credential::new(SecretString::from(self.password)),
        )
    }
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("user_id", &self.user_id)
            .field("password", &"***")
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("user_id", &self.user_id)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(rename = "token", alias = "accessToken")]
    pub access_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use secrecy::ExposeSecret;

    #[test]
    fn signup_request_uses_camel_case_and_optional_email() -> Result<()> {
        let request: SignupRequest = serde_json::from_value(serde_json::json!({
            "userId": "u1",
            "password": "p1",
            "userName": "One"
        }))?;
        assert!(request.email.is_none());
        let (profile, credential) = request.into_parts();
        assert_eq!(profile.user_id, "u1");
        assert_eq!(credential.secret.expose_secret(), "p1");
        Ok(())
    }

    #[test]
    fn verify_request_reads_token_and_access_token_alias() -> Result<()> {
        let request: VerifyRequest = serde_json::from_value(serde_json::json!({"token": "abc"}))?;
        assert_eq!(request.access_token, "abc");
        let request: VerifyRequest =
            serde_json::from_value(serde_json::json!({"accessToken": "def"}))?;
        assert_eq!(request.access_token, "def");
        Ok(())
    }

    #[test]
    fn verify_request_serializes_as_token() -> Result<()> {
        let value = serde_json::to_value(VerifyRequest {
            access_token: "abc".to_string(),
        })?;
        assert_eq!(value, serde_json::json!({"token": "abc"}));
        Ok(())
    }

    #[test]
    fn login_request_debug_hides_password() -> Result<()> {
        let request: LoginRequest = serde_json::from_value(serde_json::json!({
            "userId": "u1",
            "password": "hunter2"
        }))?;
        assert!(!format!("{request:?}").contains("hunter2"));
        Ok(())
    }
}
