//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and
//! retrieved from the database. Note that these may differ from
//! API-specific models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,

    #[validate(custom(function = "validate_phone_number"))]
    pub phone: Option<String>,

    #[validate(length(min = 1, message = "Password hash is required"))]
    pub password_hash: String,

    #[validate(length(max = 255, message = "Full name too long"))]
    pub full_name: Option<String>,
}

/// Delivery channel for a one-time passcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OtpChannel {
    Email,
    Sms,
}

impl std::fmt::Display for OtpChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OtpChannel::Email => write!(f, "email"),
            OtpChannel::Sms => write!(f, "sms"),
        }
    }
}

impl std::str::FromStr for OtpChannel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(OtpChannel::Email),
            "sms" => Ok(OtpChannel::Sms),
            _ => Err(format!("Invalid OTP channel: {s}")),
        }
    }
}

/// Business context an OTP was issued for. A code is only valid for the
/// purpose it was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Registration,
    Login,
    ResetPassword,
}

impl std::fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OtpPurpose::Registration => write!(f, "registration"),
            OtpPurpose::Login => write!(f, "login"),
            OtpPurpose::ResetPassword => write!(f, "reset_password"),
        }
    }
}

impl std::str::FromStr for OtpPurpose {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registration" => Ok(OtpPurpose::Registration),
            "login" => Ok(OtpPurpose::Login),
            "reset_password" => Ok(OtpPurpose::ResetPassword),
            _ => Err(format!("Invalid OTP purpose: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Otp {
    pub id: i64,
    pub user_id: i64,
    pub otp_code: String,
    pub otp_type: OtpChannel,
    pub purpose: OtpPurpose,
    pub is_used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOtp {
    pub user_id: i64,

    #[validate(length(min = 1, message = "OTP code is required"))]
    pub otp_code: String,

    pub otp_type: OtpChannel,
    pub purpose: OtpPurpose,

    #[validate(custom(function = "validate_expiry_time"))]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRefreshToken {
    pub user_id: i64,

    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    pub expires_at: DateTime<Utc>,
}

/// Validates an E.164-like phone number: an optional leading `+` followed
/// by 9 to 15 digits (a leading country `1` may precede the rest).
pub fn validate_phone_number(phone: &str) -> Result<(), validator::ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let digits = digits.strip_prefix('1').unwrap_or(digits);
    if digits.len() < 9 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(validator::ValidationError::new(
            "Invalid phone number format",
        ));
    }
    Ok(())
}

/// Validates that the expiry time is in the future
fn validate_expiry_time(expires_at: &DateTime<Utc>) -> Result<(), validator::ValidationError> {
    if expires_at <= &Utc::now() {
        return Err(validator::ValidationError::new(
            "expires_at must be in the future",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validation() {
        assert!(validate_phone_number("+2348012345678").is_ok());
        assert!(validate_phone_number("08012345678").is_ok());
        assert!(validate_phone_number("+15551234567").is_ok());
        assert!(validate_phone_number("12345").is_err());
        assert!(validate_phone_number("+123-456-7890").is_err());
        assert!(validate_phone_number("not-a-number").is_err());
    }
}
