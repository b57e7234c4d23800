//! Database repositories for persistence operations.
//!
//! Each repository wraps the shared connection pool and exposes named,
//! typed query methods for one entity.

pub mod otp_repository;
pub mod refresh_token_repository;
pub mod user_repository;
