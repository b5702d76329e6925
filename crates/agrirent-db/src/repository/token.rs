//! # Revoked Token Repository
//!
//! Session tokens are stateless JWTs; logout records the token's `jti` here
//! and the auth extractor refuses any token found in this table.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for the logout deny-list.
#[derive(Debug, Clone)]
pub struct RevokedTokenRepository {
    pool: SqlitePool,
}

impl RevokedTokenRepository {
    /// Creates a new RevokedTokenRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RevokedTokenRepository { pool }
    }

    /// Records a token as revoked. Revoking twice is a no-op.
    pub async fn revoke(&self, jti: &str, account_id: &str, expires_at: DateTime<Utc>) -> DbResult<()> {
        debug!(account_id, "Revoking session token");

        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, account_id, expires_at, revoked_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(account_id)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Whether a token has been revoked.
    pub async fn is_revoked(&self, jti: &str) -> DbResult<bool> {
        let revoked: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = ?1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await?;

        Ok(revoked)
    }

    /// Drops entries whose token would be rejected as expired anyway.
    ///
    /// ## Returns
    /// Number of rows removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < ?1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
