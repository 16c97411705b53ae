use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{CredentialRecord, CredentialStore, InsertOutcome};
use crate::auth::{
    member::{Member, MemberStatus},
    token::unix_now,
};

#[derive(Debug, Default)]
struct Inner {
    members: HashMap<String, CredentialRecord>,
    // jti -> expiry
    revoked: HashMap<String, i64>,
}

/// Process-local store. The uniqueness check and insert share one write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Change a member's status; returns false if the member does not exist.
    pub async fn set_status(&self, user_id: &str, status: MemberStatus) -> bool {
        let mut inner = self.inner.write().await;
        inner.members.get_mut(user_id).is_some_and(|record| {
            record.member.status = status;
            true
        })
    }

    /// Remove a member and its credential.
    pub async fn remove_member(&self, user_id: &str) -> bool {
        self.inner.write().await.members.remove(user_id).is_some()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_member(&self, member: &Member, password_hash: &str) -> Result<InsertOutcome> {
        let mut inner = self.inner.write().await;
        if inner.members.contains_key(&member.user_id) {
            return Ok(InsertOutcome::Conflict);
        }
        inner.members.insert(
            member.user_id.clone(),
            CredentialRecord {
                member: member.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(InsertOutcome::Created)
    }

    async fn find_credential(&self, user_id: &str) -> Result<Option<CredentialRecord>> {
        Ok(self.inner.read().await.members.get(user_id).cloned())
    }

    async fn find_member(&self, user_id: &str) -> Result<Option<Member>> {
        Ok(self
            .inner
            .read()
            .await
            .members
            .get(user_id)
            .map(|record| record.member.clone()))
    }

    async fn revoke_token(&self, jti: &str, expires_at: i64) -> Result<bool> {
        let mut inner = self.inner.write().await;
        // Expired entries can never match a token that still verifies.
        let now = unix_now();
        inner.revoked.retain(|_, exp| *exp > now);
        Ok(inner.revoked.insert(jti.to_string(), expires_at).is_none())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool> {
        Ok(self.inner.read().await.revoked.contains_key(jti))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
