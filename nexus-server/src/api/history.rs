//! Play history endpoints
//!
//! The player reports a play when it starts a track; "jump back in"
//! rendering reads the recorded tracks straight from the stored JSON.

use axum::{
    extract::{Query, State},
    Json,
};
use nexus_common::{db, Track};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ApiError;
use crate::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
}

/// GET /api/history?limit=...
pub async fn get_history_api(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Value>, ApiError> {
    let limit = params
        .limit
        .filter(|&l| l > 0)
        .unwrap_or(DEFAULT_HISTORY_LIMIT);
    let history = db::get_history(&state.db, limit).await?;
    Ok(Json(json!({ "history": history })))
}

/// POST /api/history
pub async fn record_play_api(
    State(state): State<AppState>,
    Json(track): Json<Track>,
) -> Result<Json<Value>, ApiError> {
    db::record_play(&state.db, &track).await?;
    Ok(Json(json!({ "success": true })))
}
