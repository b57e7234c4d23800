//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for registration, login,
//! OTP issuance and verification, token refresh, password reset, and
//! logout, delegating the business logic to `auth::service`.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::config::Config;
use crate::repositories::user_repository::UserRepository;
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// Handle user registration request
#[axum::debug_handler]
pub async fn register(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<RegisterResponse>>), (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.register(payload).await {
        Ok(response) => Ok((
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(response, "Registration successful")),
        )),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<LoginResponse>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.login(payload).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(
            response,
            "Login successful",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle OTP issuance request
#[axum::debug_handler]
pub async fn request_otp(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<OtpRequest>,
) -> Result<ResponseJson<ApiResponse<OtpResponse>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.request_otp(payload).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(response, "OTP sent"))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle OTP verification request
#[axum::debug_handler]
pub async fn verify_otp(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<OtpVerifyRequest>,
) -> Result<ResponseJson<ApiResponse<VerifyOtpResponse>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.verify_otp(payload).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(
            response,
            "OTP verified",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle token refresh request
#[axum::debug_handler]
pub async fn refresh_token(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<ResponseJson<ApiResponse<RefreshTokenResponse>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.refresh_token(payload).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(
            response,
            "Token refreshed",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle password reset request
#[axum::debug_handler]
pub async fn reset_password(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<ResponseJson<ApiResponse<MessageResponse>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.reset_password(payload).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(
            response,
            "Password reset",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle logout request, revoking the presented refresh token
#[axum::debug_handler]
pub async fn logout(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<LogoutRequest>,
) -> Result<ResponseJson<ApiResponse<MessageResponse>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.logout(payload).await {
        Ok(response) => Ok(ResponseJson(ApiResponse::success(response, "Logged out"))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Get current user information from the access token
#[axum::debug_handler]
pub async fn me(
    Extension(pool): Extension<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<ResponseJson<ApiResponse<UserInfo>>, (StatusCode, String)> {
    let user_repo = UserRepository::new(&pool);

    let user = match user_repo.get_user_by_email(claims.subject()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Err((
                StatusCode::UNAUTHORIZED,
                "Could not validate credentials".to_string(),
            ));
        }
        Err(e) => {
            tracing::error!("Failed to load current user: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ));
        }
    };

    Ok(ResponseJson(ApiResponse::success(
        UserInfo::from(user),
        "User retrieved successfully",
    )))
}
