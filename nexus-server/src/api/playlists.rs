//! Playlist endpoints
//!
//! Duplicate names and duplicate membership are expected conditions:
//! they come back as 200 with `{success: false, error}` so the
//! front-end can surface them inline.

use axum::{
    extract::{Path, State},
    Json,
};
use nexus_common::{
    db::{self, CreatePlaylistOutcome, StoreOutcome},
    Track,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ApiError;
use crate::AppState;

/// GET /api/playlists
pub async fn get_playlists_api(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let playlists = db::get_playlists(&state.db).await?;
    Ok(Json(json!({ "playlists": playlists })))
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistBody {
    pub name: Option<String>,
}

/// POST /api/playlists
pub async fn create_playlist_api(
    State(state): State<AppState>,
    Json(body): Json<CreatePlaylistBody>,
) -> Result<Json<CreatePlaylistOutcome>, ApiError> {
    let Some(name) = body.name.filter(|n| !n.trim().is_empty()) else {
        return Ok(Json(CreatePlaylistOutcome {
            success: false,
            id: None,
            name: None,
            error: Some("Name required".to_string()),
        }));
    };

    let outcome = db::create_playlist(&state.db, &name).await?;
    Ok(Json(outcome))
}

/// POST /api/playlists/:id/add
pub async fn add_playlist_song_api(
    State(state): State<AppState>,
    Path(playlist_id): Path<i64>,
    Json(track): Json<Track>,
) -> Result<Json<StoreOutcome>, ApiError> {
    let outcome = db::add_to_playlist(&state.db, playlist_id, &track).await?;
    Ok(Json(outcome))
}

/// GET /api/playlists/:id
pub async fn get_playlist_songs_api(
    State(state): State<AppState>,
    Path(playlist_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let songs = db::get_playlist_songs(&state.db, playlist_id).await?;
    Ok(Json(json!({ "songs": songs })))
}
