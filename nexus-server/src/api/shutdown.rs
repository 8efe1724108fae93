//! Sleep-timer shutdown endpoint

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

use crate::AppState;

/// POST /api/shutdown
///
/// Schedules a graceful shutdown and returns immediately. The delay
/// lets this response flush before the serve loop stops accepting;
/// in-flight requests still drain through the graceful path.
pub async fn shutdown_api(State(state): State<AppState>) -> Json<Value> {
    info!("Sleep timer triggered: shutting down server");

    let shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let _ = shutdown.send(()).await;
    });

    Json(json!({ "success": true, "message": "Goodnight!" }))
}
