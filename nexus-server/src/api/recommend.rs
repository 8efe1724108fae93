//! Mix recommendation endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use nexus_common::Track;
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub track: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<Track>,
}

/// GET /api/recommend?artist=...&track=...
///
/// Mix generation seeded by the currently playing track. The seed track
/// itself is filtered out by exact title match.
pub async fn recommend_api(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> Json<RecommendResponse> {
    let recommendations = state
        .aggregator
        .recommend(&params.artist, &params.track)
        .await;

    Json(RecommendResponse { recommendations })
}
