//! Signup, login, member resolution and refresh orchestration.

use anyhow::{anyhow, Context};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    error::AuthError,
    member::{Credential, Member, MemberProfile},
    password,
    store::{CredentialStore, InsertOutcome},
    token::{MemberIdentity, TokenIssuer, TokenKind, TokenPair},
};

/// Everything the HTTP layer needs, constructed once at startup.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    issuer: TokenIssuer,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, issuer: TokenIssuer) -> Self {
        Self { store, issuer }
    }

    #[must_use]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Register a member. No tokens are issued.
    ///
    /// # Errors
    /// `InvalidRequest` for bad input, `DuplicateIdentifier` when the
    /// identifier is taken, `Internal` on store or hashing failure.
    #[instrument(skip(self, profile, credential), fields(user_id = %profile.user_id))]
    pub async fn signup(
        &self,
        profile: MemberProfile,
        credential: Credential,
    ) -> Result<Member, AuthError> {
        let member = profile.into_member()?;
        credential.validate()?;

        let password_hash = hash_blocking(credential.secret).await?;

        match self.store.insert_member(&member, &password_hash).await? {
            InsertOutcome::Created => {
                info!("member registered");
                Ok(member)
            }
            InsertOutcome::Conflict => {
                debug!("identifier already registered");
                Err(AuthError::DuplicateIdentifier)
            }
        }
    }

    /// Check credentials. Unknown identifier, wrong secret and suspended
    /// member all yield `None`.
    ///
    /// # Errors
    /// `Internal` on store failure or an unreadable stored hash.
    #[instrument(skip(self, secret))]
    pub async fn login(
        &self,
        user_id: &str,
        secret: SecretString,
    ) -> Result<Option<Member>, AuthError> {
        let record = self.store.find_credential(user_id.trim()).await?;

        let Some(record) = record else {
            tokio::task::spawn_blocking(move || password::verify_against_dummy(&secret))
                .await
                .context("dummy verification task failed")?;
            debug!("login failed");
            return Ok(None);
        };

        let hash = record.password_hash;
        let matches =
            tokio::task::spawn_blocking(move || password::verify_secret(&secret, &hash))
                .await
                .context("password verification task failed")??;

        if matches && record.member.is_active() {
            info!("login succeeded");
            Ok(Some(record.member))
        } else {
            debug!("login failed");
            Ok(None)
        }
    }

    /// Authorization gate, independent of token validity.
    #[must_use]
    pub fn validate_member_access(&self, member: &Member) -> bool {
        member.is_active()
    }

    /// Issue a fresh access/refresh pair for a member.
    ///
    /// # Errors
    /// `Internal` if signing fails.
    pub fn issue_tokens(&self, member: &Member) -> Result<TokenPair, AuthError> {
        self.issuer.issue(member)
    }

    /// Verify `token` as `kind` and load the member it names, whatever its
    /// status. Callers gate on `validate_member_access`.
    ///
    /// # Errors
    /// Token errors from verification, `RevokedToken` for a rotated refresh
    /// token, `MemberNotFound` if the member is gone.
    #[instrument(skip(self, token))]
    pub async fn resolve_member(&self, token: &str, kind: TokenKind) -> Result<Member, AuthError> {
        let identity = self.verify(token, kind).await?;
        self.load_member(&identity).await
    }

    /// Exchange a refresh token for a new pair, revoking the presented one.
    ///
    /// # Errors
    /// Token errors, `RevokedToken`, `MemberNotFound`, `Forbidden` for a
    /// suspended member, or `Internal`.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<(Member, TokenPair), AuthError> {
        let identity = self.verify(refresh_token, TokenKind::Refresh).await?;
        let member = self.load_member(&identity).await?;
        if !self.validate_member_access(&member) {
            return Err(AuthError::Forbidden);
        }

        // Rotate before issuing; a concurrent refresh with the same token loses.
        if !self
            .store
            .revoke_token(&identity.jti, identity.expires_at)
            .await?
        {
            warn!(user_id = %member.user_id, "refresh token already rotated");
            return Err(AuthError::RevokedToken);
        }

        let pair = self.issuer.issue(&member)?;
        info!(user_id = %member.user_id, "tokens refreshed");
        Ok((member, pair))
    }

    async fn verify(&self, token: &str, kind: TokenKind) -> Result<MemberIdentity, AuthError> {
        match kind {
            TokenKind::Access => self.issuer.verify_access(token),
            TokenKind::Refresh => {
                let identity = self.issuer.verify_refresh(token)?;
                if self.store.is_revoked(&identity.jti).await? {
                    warn!(user_id = %identity.user_id, "revoked refresh token presented");
                    return Err(AuthError::RevokedToken);
                }
                Ok(identity)
            }
        }
    }

    async fn load_member(&self, identity: &MemberIdentity) -> Result<Member, AuthError> {
        self.store
            .find_member(&identity.user_id)
            .await?
            .ok_or(AuthError::MemberNotFound)
    }
}

async fn hash_blocking(secret: SecretString) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || password::hash_secret(&secret))
        .await
        .map_err(|e| AuthError::Internal(anyhow!("hashing task failed: {e}")))?
        .map_err(AuthError::Internal)
}
