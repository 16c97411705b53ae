//! HS256 access and refresh tokens.
//!
//! Tokens are compact JWTs (`header.claims.signature`, base64url without
//! padding). Both kinds share the signing key and differ by the `typ` claim
//! and their lifetime. Expiry is inclusive: a token checked at exactly its
//! `exp` second is expired.

use anyhow::{anyhow, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use ulid::Ulid;
use utoipa::ToSchema;

use super::{error::AuthError, member::Member};

type HmacSha256 = Hmac<Sha256>;

pub const TOKEN_VERSION: u8 = 1;
const MIN_SECRET_LEN: usize = 32;
const DEFAULT_ACCESS_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_ISSUER: &str = "membership";
/// Upper bound for either token lifetime: one year.
pub const MAX_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct TokenHeader {
    alg: String,
    typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub v: u8,
    pub iss: String,
    pub sub: String,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Who a verified token speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberIdentity {
    pub user_id: String,
    pub jti: String,
    pub expires_at: i64,
}

impl From<TokenClaims> for MemberIdentity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            jti: claims.jti,
            expires_at: claims.exp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct TokenConfig {
    secret: SecretString,
    issuer: String,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenConfig {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            issuer: DEFAULT_ISSUER.to_string(),
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: String) -> Self {
        self.issuer = issuer;
        self
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    #[must_use]
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    #[must_use]
    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"***")
            .field("issuer", &self.issuer)
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .finish()
    }
}

/// Signs and verifies member tokens. Pure: no I/O and no shared state.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    config: TokenConfig,
}

impl TokenIssuer {
    /// # Errors
    /// Returns an error if the secret is shorter than 32 bytes, a TTL is not
    /// within `1..=MAX_TTL_SECONDS`, or access is not shorter than refresh.
    pub fn new(config: TokenConfig) -> Result<Self> {
        if config.secret.expose_secret().len() < MIN_SECRET_LEN {
            return Err(anyhow!(
                "token secret must be at least {MIN_SECRET_LEN} bytes"
            ));
        }
        if config.access_ttl_seconds <= 0 || config.refresh_ttl_seconds <= 0 {
            return Err(anyhow!("token TTLs must be positive"));
        }
        if config.access_ttl_seconds > MAX_TTL_SECONDS
            || config.refresh_ttl_seconds > MAX_TTL_SECONDS
        {
            return Err(anyhow!("token TTLs must not exceed {MAX_TTL_SECONDS} seconds"));
        }
        if config.access_ttl_seconds >= config.refresh_ttl_seconds {
            return Err(anyhow!(
                "access token TTL ({}s) must be shorter than refresh token TTL ({}s)",
                config.access_ttl_seconds,
                config.refresh_ttl_seconds
            ));
        }
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Issue an access/refresh pair for `member` at the current time.
    ///
    /// # Errors
    /// Returns `AuthError::Internal` if signing fails.
    pub fn issue(&self, member: &Member) -> Result<TokenPair, AuthError> {
        self.issue_at(member, unix_now())
    }

    /// # Errors
    /// Returns `AuthError::Internal` if signing fails or the expiry does not
    /// fit in an `i64`.
    pub fn issue_at(&self, member: &Member, now: i64) -> Result<TokenPair, AuthError> {
        let access_token = self.sign(&self.claims(member, TokenKind::Access, now)?)?;
        let refresh_token = self.sign(&self.claims(member, TokenKind::Refresh, now)?)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// # Errors
    /// `MalformedToken`, `InvalidToken` or `ExpiredToken`.
    pub fn verify_access(&self, token: &str) -> Result<MemberIdentity, AuthError> {
        self.verify_at(token, TokenKind::Access, unix_now())
    }

    /// Verify signature and expiry of a refresh token. Revocation is checked
    /// by the caller against the credential store.
    ///
    /// # Errors
    /// `MalformedToken`, `InvalidToken` or `ExpiredToken`.
    pub fn verify_refresh(&self, token: &str) -> Result<MemberIdentity, AuthError> {
        self.verify_at(token, TokenKind::Refresh, unix_now())
    }

    /// # Errors
    /// `MalformedToken`, `InvalidToken` or `ExpiredToken`.
    pub fn verify_at(
        &self,
        token: &str,
        kind: TokenKind,
        now: i64,
    ) -> Result<MemberIdentity, AuthError> {
        let mut parts = token.trim().split('.');
        let header_b64 = parts.next().ok_or(AuthError::MalformedToken)?;
        let claims_b64 = parts.next().ok_or(AuthError::MalformedToken)?;
        let sig_b64 = parts.next().ok_or(AuthError::MalformedToken)?;
        if parts.next().is_some() {
            return Err(AuthError::MalformedToken);
        }

        let header: TokenHeader = b64d_json(header_b64)?;
        if header.alg != "HS256" {
            return Err(AuthError::InvalidToken);
        }

        let signature =
            Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| AuthError::MalformedToken)?;
        let mut mac = self.mac()?;
        mac.update(format!("{header_b64}.{claims_b64}").as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let claims: TokenClaims = b64d_json(claims_b64)?;
        if claims.v != TOKEN_VERSION || claims.iss != self.config.issuer || claims.typ != kind {
            return Err(AuthError::InvalidToken);
        }
        if claims.exp <= now {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims.into())
    }

    fn claims(
        &self,
        member: &Member,
        kind: TokenKind,
        now: i64,
    ) -> Result<TokenClaims, AuthError> {
        let ttl = match kind {
            TokenKind::Access => self.config.access_ttl_seconds,
            TokenKind::Refresh => self.config.refresh_ttl_seconds,
        };
        let exp = now
            .checked_add(ttl)
            .ok_or_else(|| AuthError::Internal(anyhow!("token expiry overflow")))?;
        Ok(TokenClaims {
            v: TOKEN_VERSION,
            iss: self.config.issuer.clone(),
            sub: member.user_id.clone(),
            typ: kind,
            iat: now,
            exp,
            jti: Ulid::new().to_string(),
        })
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        let header_b64 = b64e_json(&TokenHeader::hs256())?;
        let claims_b64 = b64e_json(claims)?;
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{signing_input}.{}",
            Base64UrlUnpadded::encode_string(&signature)
        ))
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(self.config.secret.expose_secret().as_bytes())
            .map_err(|e| AuthError::Internal(anyhow!("hmac key error: {e}")))
    }
}

/// Seconds since the Unix epoch.
#[must_use]
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, AuthError> {
    let json = serde_json::to_vec(value).map_err(anyhow::Error::from)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, AuthError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| AuthError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::member::MemberStatus;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";
    const NOW: i64 = 1_700_000_000;

    fn issuer() -> Result<TokenIssuer> {
        TokenIssuer::new(
            TokenConfig::new(SecretString::from(SECRET))
                .with_access_ttl_seconds(60)
                .with_refresh_ttl_seconds(3600),
        )
    }

    fn member(user_id: &str) -> Member {
        Member {
            user_id: user_id.to_string(),
            user_name: "User".to_string(),
            email: None,
            status: MemberStatus::Active,
        }
    }

    #[test]
    fn issued_access_token_verifies_to_same_member() -> anyhow::Result<()> {
        let issuer = issuer()?;
        let pair = issuer.issue_at(&member("u1"), NOW)?;
        let identity = issuer.verify_at(&pair.access_token, TokenKind::Access, NOW + 1)?;
        assert_eq!(identity.user_id, "u1");
        assert_eq!(identity.expires_at, NOW + 60);
        Ok(())
    }

    #[test]
    fn verification_is_idempotent() -> anyhow::Result<()> {
        let issuer = issuer()?;
        let pair = issuer.issue_at(&member("u1"), NOW)?;
        let first = issuer.verify_at(&pair.refresh_token, TokenKind::Refresh, NOW + 10)?;
        let second = issuer.verify_at(&pair.refresh_token, TokenKind::Refresh, NOW + 10)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn expiry_boundary_is_inclusive() -> anyhow::Result<()> {
        let issuer = issuer()?;
        let pair = issuer.issue_at(&member("u1"), NOW)?;
        assert!(issuer
            .verify_at(&pair.access_token, TokenKind::Access, NOW + 59)
            .is_ok());
        assert!(matches!(
            issuer.verify_at(&pair.access_token, TokenKind::Access, NOW + 60),
            Err(AuthError::ExpiredToken)
        ));
        Ok(())
    }

    #[test]
    fn refresh_outlives_access() -> anyhow::Result<()> {
        let issuer = issuer()?;
        let pair = issuer.issue_at(&member("u1"), NOW)?;
        let at = NOW + 120;
        assert!(matches!(
            issuer.verify_at(&pair.access_token, TokenKind::Access, at),
            Err(AuthError::ExpiredToken)
        ));
        assert!(issuer
            .verify_at(&pair.refresh_token, TokenKind::Refresh, at)
            .is_ok());
        Ok(())
    }

    #[test]
    fn kinds_are_not_interchangeable() -> anyhow::Result<()> {
        let issuer = issuer()?;
        let pair = issuer.issue_at(&member("u1"), NOW)?;
        assert!(matches!(
            issuer.verify_at(&pair.refresh_token, TokenKind::Access, NOW),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            issuer.verify_at(&pair.access_token, TokenKind::Refresh, NOW),
            Err(AuthError::InvalidToken)
        ));
        Ok(())
    }

    #[test]
    fn tampered_signature_is_invalid() -> anyhow::Result<()> {
        let issuer = issuer()?;
        let pair = issuer.issue_at(&member("u1"), NOW)?;
        let other = TokenIssuer::new(
            TokenConfig::new(SecretString::from("another-secret-another-secret-123"))
                .with_access_ttl_seconds(60)
                .with_refresh_ttl_seconds(3600),
        )?;
        assert!(matches!(
            other.verify_at(&pair.access_token, TokenKind::Access, NOW),
            Err(AuthError::InvalidToken)
        ));

        // Swap the claims of one token into the signature of another.
        let forged = issuer.issue_at(&member("admin"), NOW)?;
        let parts: Vec<&str> = pair.access_token.split('.').collect();
        let forged_parts: Vec<&str> = forged.access_token.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);
        assert!(matches!(
            issuer.verify_at(&spliced, TokenKind::Access, NOW),
            Err(AuthError::InvalidToken)
        ));
        Ok(())
    }

    #[test]
    fn garbage_is_malformed() -> anyhow::Result<()> {
        let issuer = issuer()?;
        for token in ["", "abc", "a.b", "a.b.c.d", "!!!.???.***"] {
            assert!(
                matches!(
                    issuer.verify_at(token, TokenKind::Access, NOW),
                    Err(AuthError::MalformedToken)
                ),
                "token {token:?} should be malformed"
            );
        }
        Ok(())
    }

    #[test]
    fn foreign_issuer_is_invalid() -> anyhow::Result<()> {
        let issuer = issuer()?;
        let foreign = TokenIssuer::new(
            TokenConfig::new(SecretString::from(SECRET))
                .with_issuer("someone-else".to_string())
                .with_access_ttl_seconds(60)
                .with_refresh_ttl_seconds(3600),
        )?;
        let pair = foreign.issue_at(&member("u1"), NOW)?;
        assert!(matches!(
            issuer.verify_at(&pair.access_token, TokenKind::Access, NOW),
            Err(AuthError::InvalidToken)
        ));
        Ok(())
    }

    #[test]
    fn each_token_has_unique_jti() -> anyhow::Result<()> {
        let issuer = issuer()?;
        let pair = issuer.issue_at(&member("u1"), NOW)?;
        let access = issuer.verify_at(&pair.access_token, TokenKind::Access, NOW)?;
        let refresh = issuer.verify_at(&pair.refresh_token, TokenKind::Refresh, NOW)?;
        assert_ne!(access.jti, refresh.jti);
        Ok(())
    }

    #[test]
    fn config_validation() {
        assert!(TokenIssuer::new(TokenConfig::new(SecretString::from("short"))).is_err());
        assert!(TokenIssuer::new(
            TokenConfig::new(SecretString::from(SECRET))
                .with_access_ttl_seconds(3600)
                .with_refresh_ttl_seconds(3600)
        )
        .is_err());
        assert!(TokenIssuer::new(
            TokenConfig::new(SecretString::from(SECRET)).with_access_ttl_seconds(0)
        )
        .is_err());
        assert!(TokenIssuer::new(TokenConfig::new(SecretString::from(SECRET))).is_ok());
    }

    #[test]
    fn ttl_above_one_year_is_rejected() {
        assert!(TokenIssuer::new(
            TokenConfig::new(SecretString::from(SECRET)).with_refresh_ttl_seconds(i64::MAX)
        )
        .is_err());
        assert!(TokenIssuer::new(
            TokenConfig::new(SecretString::from(SECRET))
                .with_refresh_ttl_seconds(MAX_TTL_SECONDS + 1)
        )
        .is_err());
        assert!(TokenIssuer::new(
            TokenConfig::new(SecretString::from(SECRET))
                .with_refresh_ttl_seconds(MAX_TTL_SECONDS)
        )
        .is_ok());
    }

    #[test]
    fn expiry_overflow_is_internal_error() -> anyhow::Result<()> {
        let issuer = issuer()?;
        assert!(matches!(
            issuer.issue_at(&member("u1"), i64::MAX - 30),
            Err(AuthError::Internal(_))
        ));
        Ok(())
    }

    #[test]
    fn config_debug_is_redacted() {
        let config = TokenConfig::new(SecretString::from(SECRET));
        assert!(!format!("{config:?}").contains(SECRET));
    }

    #[test]
    fn issuer_keeps_its_configuration() -> anyhow::Result<()> {
        let issuer = TokenIssuer::new(
            TokenConfig::new(SecretString::from(SECRET))
                .with_issuer("members.example".to_string())
                .with_access_ttl_seconds(300),
        )?;
        assert_eq!(issuer.config().issuer(), "members.example");
        assert_eq!(issuer.config().access_ttl_seconds(), 300);
        assert_eq!(
            issuer.config().refresh_ttl_seconds(),
            DEFAULT_REFRESH_TTL_SECONDS
        );
        Ok(())
    }
}
