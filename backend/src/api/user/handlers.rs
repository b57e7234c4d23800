//! Handler functions for user profile API endpoints.
//!
//! These functions process requests for user data beyond the caller's own
//! token-derived identity.

use crate::api::common::ApiResponse;
use crate::auth::models::UserInfo;
use crate::repositories::user_repository::UserRepository;
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use sqlx::SqlitePool;

/// Retrieves a user by its ID.
///
/// A caller may read its own record; reading anyone else requires the
/// superuser flag.
#[axum::debug_handler]
pub async fn get_user_by_id(
    Extension(claims): Extension<Claims>,
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<UserInfo>>, (StatusCode, String)> {
    let user_repo = UserRepository::new(&pool);

    let current_user = match user_repo.get_user_by_email(claims.subject()).await {
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

    if current_user.id != id && !current_user.is_superuser {
        return Err((
            StatusCode::FORBIDDEN,
            "Not enough permissions".to_string(),
        ));
    }

    let user = match user_repo.get_user_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err((StatusCode::NOT_FOUND, "User not found".to_string())),
        Err(e) => {
            tracing::error!("Failed to load user {}: {}", id, e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ));
        }
    };

    Ok(Json(ApiResponse::success(
        UserInfo::from(user),
        "User retrieved successfully",
    )))
}
