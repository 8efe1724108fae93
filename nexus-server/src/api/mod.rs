//! HTTP API handlers for nexus-server

pub mod health;
pub mod history;
pub mod library;
pub mod lyrics;
pub mod party;
pub mod playlists;
pub mod recommend;
pub mod search;
pub mod shutdown;
pub mod stream;

pub use health::{health_routes, status};
pub use history::{get_history_api, record_play_api};
pub use library::{add_library_api, get_library_api, remove_library_api};
pub use lyrics::lyrics_api;
pub use party::party_info;
pub use playlists::{
    add_playlist_song_api, create_playlist_api, get_playlist_songs_api, get_playlists_api,
};
pub use recommend::recommend_api;
pub use search::search_api;
pub use shutdown::shutdown_api;
pub use stream::stream_proxy;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Handler-level errors with a JSON error body
///
/// Store constraint violations never land here; those are structured
/// success/failure payloads. This covers client input errors and
/// genuine server failures.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<nexus_common::Error> for ApiError {
    fn from(e: nexus_common::Error) -> Self {
        match e {
            nexus_common::Error::InvalidInput(message) => ApiError::BadRequest(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => {
                error!("Request failed: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
