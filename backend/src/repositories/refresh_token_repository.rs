//! Database repository for persisted refresh-token records.
//!
//! Access tokens are stateless; refresh tokens additionally get a backing
//! record so individual tokens can be revoked before their signed expiry.

use crate::database::models::{CreateRefreshToken, RefreshToken};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

/// Repository for refresh-token database operations.
pub struct RefreshTokenRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> RefreshTokenRepository<'a> {
    /// Creates a new RefreshTokenRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Persists the record backing a newly issued refresh token.
    ///
    /// Two logins within the same second mint a byte-identical token
    /// (second-resolution claims); re-issuing reactivates its record.
    pub async fn create_refresh_token(&self, token: CreateRefreshToken) -> Result<RefreshToken> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, RefreshToken>(
            "INSERT INTO refresh_tokens \
             (user_id, token, expires_at, is_revoked, created_at, updated_at) \
             VALUES (?, ?, ?, 0, ?, ?) \
             ON CONFLICT (token) DO UPDATE SET \
                 is_revoked = 0, \
                 expires_at = excluded.expires_at, \
                 updated_at = excluded.updated_at \
             RETURNING *",
        )
        .bind(token.user_id)
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// Retrieves the record for a presented refresh token, if one exists.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        let record = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token, expires_at, is_revoked, created_at, updated_at \
             FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Revokes a single refresh token.
    pub async fn revoke(&self, token: &str) -> Result<u64> {
        let rows_affected = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = 1, updated_at = ? \
             WHERE token = ? AND is_revoked = 0",
        )
        .bind(Utc::now())
        .bind(token)
        .execute(self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected)
    }

    /// Revokes every outstanding refresh token for a user. Used when the
    /// password changes.
    pub async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64> {
        let rows_affected = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = 1, updated_at = ? \
             WHERE user_id = ? AND is_revoked = 0",
        )
        .bind(Utc::now())
        .bind(user_id)
        .execute(self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected)
    }
}
