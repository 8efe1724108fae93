//! Aggregated search endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use nexus_common::Track;
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<Track>,
    pub count: usize,
}

/// GET /api/search?q=...
///
/// Fans the query out to the enabled providers. 400 on a missing or
/// empty query; a provider outage degrades to fewer results, never an
/// error.
pub async fn search_api(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.q.unwrap_or_default();
    let results = state.aggregator.search(&query).await?;

    Ok(Json(SearchResponse {
        count: results.len(),
        results,
    }))
}
