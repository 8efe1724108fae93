//! Health and status endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
///
/// Liveness check for monitoring.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "nexus-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Status response for the front-end's self-test
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    /// Resolved URLs currently held by the resolution cache
    pub cached_urls: usize,
}

/// GET /api/status
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online".to_string(),
        module: "nexus-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cached_urls: state.cache.len().await,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
