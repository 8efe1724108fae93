//! Library CRUD endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use nexus_common::{db, Track};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ApiError;
use crate::AppState;

/// GET /api/library
pub async fn get_library_api(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let library = db::get_library(&state.db).await?;
    Ok(Json(json!({ "library": library })))
}

/// POST /api/library
///
/// Idempotent: re-saving an already saved track succeeds without a
/// duplicate row.
pub async fn add_library_api(
    State(state): State<AppState>,
    Json(track): Json<Track>,
) -> Result<Json<Value>, ApiError> {
    let success = db::add_song(&state.db, &track).await?;
    Ok(Json(json!({ "success": success })))
}

#[derive(Debug, Deserialize)]
pub struct RemoveParams {
    pub id: Option<String>,
}

/// DELETE /api/library?id=...
pub async fn remove_library_api(
    State(state): State<AppState>,
    Query(params): Query<RemoveParams>,
) -> Result<Json<Value>, ApiError> {
    let Some(id) = params.id.filter(|id| !id.is_empty()) else {
        return Err(ApiError::BadRequest("No id".to_string()));
    };
    db::remove_song(&state.db, &id).await?;
    Ok(Json(json!({ "success": true })))
}
