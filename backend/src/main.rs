//! Main entry point for the AuthGate backend.
//!
//! This file initializes the Axum web server, sets up the database
//! connection, and registers all API routes and middleware.
//! It orchestrates the application's startup and defines its overall
//! structure.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod services;
mod utils;

use crate::api::common::ApiResponse;
use axum::{Extension, Router, response::Json, routing::get};
use config::Config;
use database::Database;
use tracing::info;
use tracing_subscriber::fmt::init;

#[tokio::main]
async fn main() {
    init();

    let config = Config::from_env().expect("failed to load configuration");
    let db = Database::new(&config)
        .await
        .expect("failed to initialize database");
    let pool = db.pool().clone();

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/auth", auth::routes::auth_router())
        .nest("/api/user", api::user::routes::user_router())
        .layer(Extension(pool))
        .layer(Extension(config.clone()));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .expect("failed to bind server port");

    info!("Starting AuthGate server on port {}", config.server_port);
    axum::serve(listener, app).await.expect("server error");
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "AuthGate Backend",
            "version": "0.1.0"
        }),
        "Welcome to AuthGate API",
    ))
}

async fn health_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }),
        "Service healthy",
    ))
}
