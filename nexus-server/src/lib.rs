//! nexus-server library - HTTP service for the Nexus music aggregator
//!
//! Fans search queries out to external music catalogs, proxies audio
//! playback through a resolution cache, and serves the library/playlist
//! store. Handlers live in [`api`], provider integrations in
//! [`providers`], the cache and relay in [`stream`].

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod providers;
pub mod search;
pub mod stream;

use providers::lyrics::LyricsClient;
use search::Aggregator;
use stream::{MediaResolver, UrlCache};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Process-lifetime track-id to direct-URL cache
    pub cache: Arc<UrlCache>,
    /// Multi-provider search fan-out
    pub aggregator: Arc<Aggregator>,
    /// On-demand media URL extraction (cache-miss path)
    pub resolver: Arc<dyn MediaResolver>,
    /// Lyrics lookup client
    pub lyrics: Arc<LyricsClient>,
    /// Outbound client for the streaming relay
    pub http: reqwest::Client,
    /// Signals the serve loop to shut down gracefully
    pub shutdown: mpsc::Sender<()>,
    /// Advertised port for /api/party_info
    pub port: u16,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: SqlitePool,
        cache: Arc<UrlCache>,
        aggregator: Arc<Aggregator>,
        resolver: Arc<dyn MediaResolver>,
        lyrics: Arc<LyricsClient>,
        http: reqwest::Client,
        shutdown: mpsc::Sender<()>,
        port: u16,
    ) -> Self {
        Self {
            db,
            cache,
            aggregator,
            resolver,
            lyrics,
            http,
            shutdown,
            port,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/search", get(api::search_api))
        .route("/api/recommend", get(api::recommend_api))
        .route("/stream", get(api::stream_proxy))
        .route(
            "/api/library",
            get(api::get_library_api)
                .post(api::add_library_api)
                .delete(api::remove_library_api),
        )
        .route(
            "/api/history",
            get(api::get_history_api).post(api::record_play_api),
        )
        .route("/api/lyrics", get(api::lyrics_api))
        .route(
            "/api/playlists",
            get(api::get_playlists_api).post(api::create_playlist_api),
        )
        .route("/api/playlists/:id/add", post(api::add_playlist_song_api))
        .route("/api/playlists/:id", get(api::get_playlist_songs_api))
        .route("/api/party_info", get(api::party_info))
        .route("/api/shutdown", post(api::shutdown_api))
        .route("/api/status", get(api::status))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
