//! Data structures for authentication-related entities.
//!
//! This module defines the request and response payloads for the
//! authentication flow, including the sanitized user projection returned
//! to callers.

use crate::database::models::{OtpChannel, OtpPurpose, User, validate_phone_number};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(max = 255, message = "Full name too long"))]
    pub full_name: Option<String>,

    #[validate(custom(function = "validate_phone_number"))]
    pub phone: Option<String>,
}

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// OTP issuance request
#[derive(Debug, Deserialize, Validate)]
pub struct OtpRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,

    pub otp_type: OtpChannel,
    pub purpose: OtpPurpose,
}

/// OTP verification request
#[derive(Debug, Deserialize, Validate)]
pub struct OtpVerifyRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,

    #[validate(length(min = 6, max = 6, message = "OTP code must be 6 characters"))]
    pub otp_code: String,

    pub purpose: OtpPurpose,
}

/// Token refresh request
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Password reset request, carrying the reset-purpose OTP
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,

    #[validate(length(min = 6, max = 6, message = "OTP code must be 6 characters"))]
    pub otp_code: String,
}

/// Logout request, revoking the presented refresh token
#[derive(Debug, Deserialize, Validate)]
pub struct LogoutRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Sanitized user projection, safe for external exposure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            is_active: user.is_active,
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration response containing the created user
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserInfo,
    pub message: String,
}

/// Login response containing tokens and user info
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token expiration in seconds
    pub expires_in: i64,
    pub user: UserInfo,
}

/// OTP issuance response
#[derive(Debug, Serialize)]
pub struct OtpResponse {
    pub message: String,
    pub otp_type: OtpChannel,
    /// Code lifetime in minutes
    pub expires_in: i64,
}

/// OTP verification response
#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub message: String,
    pub user: UserInfo,
}

/// Token refresh response
#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Generic acknowledgement response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub const TOKEN_TYPE_BEARER: &str = "bearer";
