//! One-time passcode business logic service.
//!
//! Handles OTP issuance, delivery, and verification.

use crate::config::Config;
use crate::database::models::{Otp, OtpChannel, OtpPurpose, User};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::otp_repository::OtpRepository;
use crate::services::email_service::EmailService;
use crate::utils::otp_code::generate_numeric_code;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

pub struct OtpService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
    config: &'a Config,
    /// Email service for delivering codes; absent when SMTP is unconfigured
    email_service: Option<EmailService>,
}

impl<'a> OtpService<'a> {
    /// Creates a new OtpService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    /// * `config` - Application configuration
    pub fn new(pool: &'a SqlitePool, config: &'a Config) -> Self {
        let email_service = match config.email_config() {
            Some(email_config) => match EmailService::new(email_config) {
                Ok(service) => Some(service),
                Err(e) => {
                    tracing::warn!(
                        "Failed to initialize email service: {}. OTP codes will be logged instead.",
                        e
                    );
                    None
                }
            },
            None => None,
        };

        Self {
            pool,
            config,
            email_service,
        }
    }

    /// Issues a fresh OTP for (user, purpose) and dispatches delivery.
    ///
    /// All previously unused codes for the same (user, purpose) are
    /// invalidated in the same transaction that inserts the replacement,
    /// so at most one live code exists per purpose at any time. Delivery
    /// is best-effort: a failed send is logged, never propagated.
    pub async fn send_otp(
        &self,
        user: &User,
        channel: OtpChannel,
        purpose: OtpPurpose,
    ) -> ServiceResult<Otp> {
        let otp_code = generate_numeric_code(self.config.otp_code_length);
        let expires_at = Utc::now() + Duration::minutes(self.config.otp_expire_minutes);
        let now = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::Database { source: e.into() })?;

        sqlx::query(
            "UPDATE otps SET is_used = 1, updated_at = ? \
             WHERE user_id = ? AND purpose = ? AND is_used = 0",
        )
        .bind(now)
        .bind(user.id)
        .bind(purpose)
        .execute(&mut *tx)
        .await
        .map_err(|e| ServiceError::Database { source: e.into() })?;

        let otp = sqlx::query_as::<_, Otp>(
            "INSERT INTO otps \
             (user_id, otp_code, otp_type, purpose, is_used, expires_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, 0, ?, ?, ?) \
             RETURNING *",
        )
        .bind(user.id)
        .bind(&otp_code)
        .bind(channel)
        .bind(purpose)
        .bind(expires_at)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ServiceError::Database { source: e.into() })?;

        tx.commit()
            .await
            .map_err(|e| ServiceError::Database { source: e.into() })?;

        match channel {
            OtpChannel::Email => self.try_send_otp_email(&user.email, &otp_code, purpose).await,
            OtpChannel::Sms => {
                // SMS delivery is not implemented; the code is persisted
                // and can still be verified.
                tracing::warn!(
                    "SMS delivery not implemented; skipping send to user {}",
                    user.id
                );
            }
        }

        Ok(otp)
    }

    /// Validates a presented code and consumes it on success.
    pub async fn verify_otp(
        &self,
        user_id: i64,
        otp_code: &str,
        purpose: OtpPurpose,
    ) -> ServiceResult<bool> {
        let repo = OtpRepository::new(self.pool);

        match repo.get_valid_otp(user_id, otp_code, purpose).await? {
            Some(otp) => {
                repo.mark_used(otp.id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Attempts to send the code by email, logging but not failing when
    /// delivery is unavailable or the transport errors.
    async fn try_send_otp_email(&self, email: &str, otp_code: &str, purpose: OtpPurpose) {
        if let Some(ref email_service) = self.email_service {
            match email_service
                .send_otp_email(email, otp_code, purpose, self.config.otp_expire_minutes)
                .await
            {
                Ok(_) => {
                    tracing::info!("OTP email sent to {}", email);
                }
                Err(e) => {
                    tracing::error!("Failed to send OTP email to {}: {}", email, e);
                }
            }
        } else {
            tracing::info!("[email simulation] OTP for {}: {}", email, otp_code);
        }
    }
}
