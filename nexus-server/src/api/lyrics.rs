//! Lyrics lookup endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use nexus_common::LyricsResult;
use serde::Deserialize;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LyricsParams {
    #[serde(default)]
    pub track: String,
    #[serde(default)]
    pub artist: String,
    pub duration: Option<u64>,
}

/// GET /api/lyrics?track=...&artist=...&duration=...
///
/// A miss is a normal outcome (`found: false`), not an error status.
pub async fn lyrics_api(
    State(state): State<AppState>,
    Query(params): Query<LyricsParams>,
) -> Json<LyricsResult> {
    Json(
        state
            .lyrics
            .lookup(&params.track, &params.artist, params.duration)
            .await,
    )
}
