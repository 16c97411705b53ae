//! Persistence seam for members, credentials and revoked refresh tokens.
//!
//! The service only talks to `dyn CredentialStore`; `PgStore` backs production
//! and `MemoryStore` backs tests and local runs without a database.

use anyhow::Result;
use async_trait::async_trait;

use super::member::Member;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Outcome when attempting to create a new member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    Conflict,
}

/// Minimal fields needed to check a login.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub member: Member,
    pub password_hash: String,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert member and credential atomically. A taken `user_id` is a
    /// `Conflict`, never a partial write.
    async fn insert_member(&self, member: &Member, password_hash: &str) -> Result<InsertOutcome>;

    async fn find_credential(&self, user_id: &str) -> Result<Option<CredentialRecord>>;

    async fn find_member(&self, user_id: &str) -> Result<Option<Member>>;

    /// Record a refresh token id as revoked until `expires_at`. Returns false
    /// if it was already revoked, so only one concurrent caller wins.
    async fn revoke_token(&self, jti: &str, expires_at: i64) -> Result<bool>;

    async fn is_revoked(&self, jti: &str) -> Result<bool>;

    /// Liveness probe used by `/health`.
    async fn ping(&self) -> Result<()>;
}
