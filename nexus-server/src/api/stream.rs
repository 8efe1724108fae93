//! Streaming proxy endpoint

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::warn;

use crate::stream::{rechunk, resolve_stream_url};
use crate::AppState;

/// The CDNs behind the resolved URLs reject obviously non-browser
/// clients
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Deserialize)]
pub struct StreamParams {
    pub url: Option<String>,
    /// Track id keying the resolution cache; uncached streams still
    /// play, they just resolve every time
    pub id: Option<String>,
}

/// GET /stream?url=...&id=...
///
/// Resolves the page URL to a direct audio URL (cache first, extraction
/// on miss) and relays the remote bytes as audio/mpeg. A relay failure
/// against a cached URL evicts the entry and re-resolves once before
/// giving up; resolved CDN URLs expire, and repeat plays should
/// self-heal rather than fail until restart.
pub async fn stream_proxy(
    State(state): State<AppState>,
    Query(params): Query<StreamParams>,
) -> Result<Response, StreamError> {
    let Some(page_url) = params.url.filter(|u| !u.is_empty()) else {
        return Err(StreamError::MissingUrl);
    };
    let track_id = params.id.as_deref();

    let resolution = resolve_stream_url(
        state.cache.as_ref(),
        state.resolver.as_ref(),
        &page_url,
        track_id,
    )
    .await
    .map_err(|e| StreamError::Resolution(e.to_string()))?;

    let upstream = match fetch_audio(&state.http, &resolution.url).await {
        Ok(upstream) => upstream,
        Err(e) if resolution.from_cache => {
            warn!("Relay failed against cached URL, re-resolving: {}", e);
            if let Some(id) = track_id {
                state.cache.remove(id).await;
            }
            let fresh = resolve_stream_url(
                state.cache.as_ref(),
                state.resolver.as_ref(),
                &page_url,
                track_id,
            )
            .await
            .map_err(|e| StreamError::Resolution(e.to_string()))?;
            fetch_audio(&state.http, &fresh.url)
                .await
                .map_err(|e| StreamError::Relay(e.to_string()))?
        }
        Err(e) => return Err(StreamError::Relay(e.to_string())),
    };

    // Content type is fixed regardless of the true upstream encoding;
    // players sniff the actual codec from the bytes
    let body = Body::from_stream(rechunk(upstream.bytes_stream()));
    Response::builder()
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .body(body)
        .map_err(|e| StreamError::Relay(e.to_string()))
}

async fn fetch_audio(
    client: &reqwest::Client,
    url: &str,
) -> reqwest::Result<reqwest::Response> {
    client
        .get(url)
        .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .await?
        .error_for_status()
}

/// Streaming errors; the caller is an audio player, so bodies are plain
/// error text
#[derive(Debug)]
pub enum StreamError {
    MissingUrl,
    Resolution(String),
    Relay(String),
}

impl IntoResponse for StreamError {
    fn into_response(self) -> Response {
        match self {
            StreamError::MissingUrl => {
                (StatusCode::BAD_REQUEST, "No URL".to_string()).into_response()
            }
            StreamError::Resolution(message) | StreamError::Relay(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}
