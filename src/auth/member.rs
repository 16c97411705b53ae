//! Member records and signup input validation.

use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::AuthError;

const MAX_SECRET_LEN: usize = 256;
const MAX_USER_NAME_LEN: usize = 100;

static IDENTIFIER_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]{1,64}$").ok());
static EMAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Suspended,
}

impl MemberStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }

    /// Parse the textual form stored in the database.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub user_id: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub status: MemberStatus,
}

impl Member {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// Profile fields supplied at signup.
#[derive(Clone, Debug)]
pub struct MemberProfile {
    pub user_id: String,
    pub user_name: String,
    pub email: Option<String>,
}

impl MemberProfile {
    /// Trim and validate signup fields, producing a new active member.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidRequest` when a field is empty or malformed.
    pub fn into_member(self) -> Result<Member, AuthError> {
        let user_id = self.user_id.trim().to_string();
        if !valid_identifier(&user_id) {
            return Err(AuthError::InvalidRequest("invalid userId".to_string()));
        }

        let user_name = self.user_name.trim().to_string();
        if user_name.is_empty() || user_name.chars().count() > MAX_USER_NAME_LEN {
            return Err(AuthError::InvalidRequest("invalid userName".to_string()));
        }

        let email = match self.email.map(|email| normalize_email(&email)) {
            Some(email) if email.is_empty() => None,
            Some(email) if !valid_email(&email) => {
                return Err(AuthError::InvalidRequest("invalid email".to_string()));
            }
            other => other,
        };

        Ok(Member {
            user_id,
            user_name,
            email,
            status: MemberStatus::Active,
        })
    }
}

/// The secret half of a signup request, before hashing.
pub struct Credential {
    pub secret: SecretString,
}

impl Credential {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// # Errors
    /// Returns `AuthError::InvalidRequest` for an empty or oversized secret.
    pub fn validate(&self) -> Result<(), AuthError> {
        let len = self.secret.expose_secret().len();
        if len == 0 || len > MAX_SECRET_LEN {
            return Err(AuthError::InvalidRequest("invalid password".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential").field("secret", &"***").finish()
    }
}

/// Identifiers are 1..=64 chars of `[A-Za-z0-9._-]`.
pub fn valid_identifier(user_id: &str) -> bool {
    IDENTIFIER_RE.as_ref().is_some_and(|re| re.is_match(user_id))
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn valid_email(email_normalized: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email_normalized))
}
