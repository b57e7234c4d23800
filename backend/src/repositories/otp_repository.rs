//! Database repository for one-time passcode records.
//!
//! A code is valid for verification iff it matches user id, code, and
//! purpose, has not been used, and has not expired. Superseded and
//! consumed codes are marked used rather than deleted.

use crate::database::models::{CreateOtp, Otp, OtpPurpose};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

/// Repository for OTP database operations.
pub struct OtpRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> OtpRepository<'a> {
    /// Creates a new OtpRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Persists a new OTP record.
    pub async fn create_otp(&self, otp: CreateOtp) -> Result<Otp> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, Otp>(
            "INSERT INTO otps \
             (user_id, otp_code, otp_type, purpose, is_used, expires_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, 0, ?, ?, ?) \
             RETURNING *",
        )
        .bind(otp.user_id)
        .bind(&otp.otp_code)
        .bind(otp.otp_type)
        .bind(otp.purpose)
        .bind(otp.expires_at)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// Looks up the currently-valid OTP matching the exact compound
    /// predicate: user, code, purpose, unused, not yet expired.
    pub async fn get_valid_otp(
        &self,
        user_id: i64,
        otp_code: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<Otp>> {
        let otp = sqlx::query_as::<_, Otp>(
            "SELECT id, user_id, otp_code, otp_type, purpose, is_used, expires_at, \
                    created_at, updated_at \
             FROM otps \
             WHERE user_id = ? AND otp_code = ? AND purpose = ? AND is_used = 0 \
               AND expires_at > ?",
        )
        .bind(user_id)
        .bind(otp_code)
        .bind(purpose)
        .bind(Utc::now())
        .fetch_optional(self.pool)
        .await?;

        Ok(otp)
    }

    /// Marks every unused OTP for (user, purpose) as used, so at most one
    /// live code exists per purpose at a time.
    pub async fn invalidate_user_otps(&self, user_id: i64, purpose: OtpPurpose) -> Result<u64> {
        let rows_affected = sqlx::query(
            "UPDATE otps SET is_used = 1, updated_at = ? \
             WHERE user_id = ? AND purpose = ? AND is_used = 0",
        )
        .bind(Utc::now())
        .bind(user_id)
        .bind(purpose)
        .execute(self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected)
    }

    /// Consumes an OTP after successful verification.
    pub async fn mark_used(&self, id: i64) -> Result<u64> {
        let rows_affected = sqlx::query("UPDATE otps SET is_used = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
