use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use tracing::{warn, Instrument};

use super::{CredentialRecord, CredentialStore, InsertOutcome};
use crate::auth::{
    member::{Member, MemberStatus},
    token::unix_now,
};

/// PostgreSQL-backed store; see `sql/schema.sql`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_span(operation: &'static str, statement: &'static str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn member_from_row(row: &PgRow) -> Result<Member> {
    let status: String = row.try_get("status")?;
    Ok(Member {
        user_id: row.try_get("user_id")?,
        user_name: row.try_get("user_name")?,
        email: row.try_get("email")?,
        status: MemberStatus::parse(&status)
            .ok_or_else(|| anyhow!("unknown member status: {status}"))?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn insert_member(&self, member: &Member, password_hash: &str) -> Result<InsertOutcome> {
        // Member and credential rows commit together or not at all.
        let mut tx = self.pool.begin().await.context("begin signup transaction")?;

        let query = r"
            INSERT INTO members (user_id, user_name, email, status)
            VALUES ($1, $2, $3, $4)
        ";
        let inserted = sqlx::query(query)
            .bind(&member.user_id)
            .bind(&member.user_name)
            .bind(&member.email)
            .bind(member.status.as_str())
            .execute(&mut *tx)
            .instrument(db_span("INSERT", query))
            .await;

        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("rollback after duplicate member failed: {rollback_err}");
                }
                return Ok(InsertOutcome::Conflict);
            }
            return Err(err).context("failed to insert member");
        }

        let query = "INSERT INTO credentials (user_id, password_hash) VALUES ($1, $2)";
        sqlx::query(query)
            .bind(&member.user_id)
            .bind(password_hash)
            .execute(&mut *tx)
            .instrument(db_span("INSERT", query))
            .await
            .context("failed to insert credential")?;

        tx.commit().await.context("commit signup transaction")?;

        Ok(InsertOutcome::Created)
    }

    async fn find_credential(&self, user_id: &str) -> Result<Option<CredentialRecord>> {
        let query = r"
            SELECT m.user_id, m.user_name, m.email, m.status, c.password_hash
            FROM members m
            JOIN credentials c ON c.user_id = m.user_id
            WHERE m.user_id = $1
        ";
        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("failed to lookup credential")?;

        row.map(|row| {
            Ok(CredentialRecord {
                member: member_from_row(&row)?,
                password_hash: row.try_get("password_hash")?,
            })
        })
        .transpose()
    }

    async fn find_member(&self, user_id: &str) -> Result<Option<Member>> {
        let query = "SELECT user_id, user_name, email, status FROM members WHERE user_id = $1";
        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("failed to lookup member")?;

        row.as_ref().map(member_from_row).transpose()
    }

    async fn revoke_token(&self, jti: &str, expires_at: i64) -> Result<bool> {
        let query = "DELETE FROM revoked_tokens WHERE expires_at <= $1";
        sqlx::query(query)
            .bind(unix_now())
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await
            .context("failed to prune revoked tokens")?;

        let query = r"
            INSERT INTO revoked_tokens (jti, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (jti) DO NOTHING
        ";
        let result = sqlx::query(query)
            .bind(jti)
            .bind(expires_at)
            .execute(&self.pool)
            .instrument(db_span("INSERT", query))
            .await
            .context("failed to revoke token")?;

        Ok(result.rows_affected() == 1)
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool> {
        let query = "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1) AS revoked";
        let row = sqlx::query(query)
            .bind(jti)
            .fetch_one(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("failed to check revocation")?;

        Ok(row.try_get("revoked")?)
    }

    async fn ping(&self) -> Result<()> {
        let acquire_span = tracing::info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")?;

        let ping_span =
            tracing::info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct FakeDbError {
        code: &'static str,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fake db error {}", self.code)
        }
    }

    impl StdError for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "fake"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    #[test]
    fn unique_violation_detected_by_sqlstate() {
        let err = sqlx::Error::Database(Box::new(FakeDbError { code: "23505" }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(FakeDbError { code: "23503" }));
        assert!(!is_unique_violation(&err));

        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
