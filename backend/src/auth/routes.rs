//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle endpoints like registration, login, OTP issuance
//! and verification, and token refreshing. They are designed to be
//! integrated into the main Axum router.

use crate::auth::handlers::*;
use crate::auth::middleware::jwt_auth;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/request-otp", post(request_otp))
        .route("/verify-otp", post(verify_otp))
        .route("/refresh", post(refresh_token))
        .route("/reset-password", post(reset_password))
        .route("/logout", post(logout))
        .route("/me", get(me).layer(middleware::from_fn(jwt_auth)))
}
