//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, server port, token lifetimes, OTP settings, and the
//! optional SMTP delivery credentials. The configuration is constructed once
//! at startup and passed by reference into the services that need it.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub server_port: u16,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    pub otp_expire_minutes: i64,
    pub otp_code_length: usize,
    pub password_min_length: usize,
    /// Declared for a future lockout policy; no code path consumes it yet.
    pub max_login_attempts: u32,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_email: Option<String>,
    pub from_name: String,
}

/// SMTP settings required to build a mail transport.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid number")?;

        let acquire_timeout_seconds = env::var("DB_ACQUIRE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("DB_ACQUIRE_TIMEOUT_SECONDS must be a valid number")?;

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVER_PORT must be a valid number")?;

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET not set")?;

        let access_token_expire_minutes = env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .context("ACCESS_TOKEN_EXPIRE_MINUTES must be a valid number")?;

        let refresh_token_expire_days = env::var("REFRESH_TOKEN_EXPIRE_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse::<i64>()
            .context("REFRESH_TOKEN_EXPIRE_DAYS must be a valid number")?;

        let otp_expire_minutes = env::var("OTP_EXPIRE_MINUTES")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<i64>()
            .context("OTP_EXPIRE_MINUTES must be a valid number")?;

        let otp_code_length = env::var("OTP_CODE_LENGTH")
            .unwrap_or_else(|_| "6".to_string())
            .parse::<usize>()
            .context("OTP_CODE_LENGTH must be a valid number")?;

        let password_min_length = env::var("PASSWORD_MIN_LENGTH")
            .unwrap_or_else(|_| "8".to_string())
            .parse::<usize>()
            .context("PASSWORD_MIN_LENGTH must be a valid number")?;

        let max_login_attempts = env::var("MAX_LOGIN_ATTEMPTS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("MAX_LOGIN_ATTEMPTS must be a valid number")?;

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .context("SMTP_PORT must be a valid number")?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            server_port,
            jwt_secret,
            access_token_expire_minutes,
            refresh_token_expire_days,
            otp_expire_minutes,
            otp_code_length,
            password_min_length,
            max_login_attempts,
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port,
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            from_email: env::var("FROM_EMAIL").ok(),
            from_name: env::var("FROM_NAME").unwrap_or_else(|_| "AuthGate".to_string()),
        })
    }

    /// Returns the SMTP settings when every required field is present.
    ///
    /// With a partial or missing SMTP configuration the OTP service falls
    /// back to logging deliveries instead of sending them.
    pub fn email_config(&self) -> Option<EmailConfig> {
        Some(EmailConfig {
            smtp_host: self.smtp_host.clone()?,
            smtp_port: self.smtp_port,
            smtp_username: self.smtp_username.clone()?,
            smtp_password: self.smtp_password.clone()?,
            from_email: self.from_email.clone()?,
            from_name: self.from_name.clone(),
        })
    }
}
