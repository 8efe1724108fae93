//! Integration tests for the nexus-server API
//!
//! Routers are exercised in-process with mock providers and a mock
//! media resolver, so no test touches a real catalog or the extraction
//! tool. The streaming relay runs against a throwaway local upstream.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::mpsc;
use tower::util::ServiceExt; // for `oneshot`

use nexus_common::{db, Error, Result, Source, Track};
use nexus_server::providers::{ExtractOptions, LyricsClient, SearchProvider};
use nexus_server::search::Aggregator;
use nexus_server::stream::{MediaResolver, UrlCache, RELAY_CHUNK_SIZE};
use nexus_server::{build_router, AppState};

// =============================================================================
// Test doubles
// =============================================================================

/// Canned search provider
struct MockProvider {
    source: Source,
    tracks: Vec<Track>,
    fail: bool,
}

impl MockProvider {
    fn returning(source: Source, tracks: Vec<Track>) -> Arc<Self> {
        Arc::new(Self {
            source,
            tracks,
            fail: false,
        })
    }

    fn failing(source: Source) -> Arc<Self> {
        Arc::new(Self {
            source,
            tracks: Vec::new(),
            fail: true,
        })
    }
}

#[async_trait]
impl SearchProvider for MockProvider {
    fn source(&self) -> Source {
        self.source
    }

    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<Track>> {
        if self.fail {
            return Err(Error::Provider("catalog unreachable".to_string()));
        }
        Ok(self.tracks.clone())
    }
}

/// Scripted resolver counting extraction calls
struct MockResolver {
    responses: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: AtomicUsize,
}

impl MockResolver {
    fn returning(url: &str) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::from([Ok(url.to_string())])),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::from([Err(message.to_string())])),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaResolver for MockResolver {
    async fn resolve(&self, _page_url: &str, _options: &ExtractOptions) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        // Repeat the final scripted response once the queue drains
        let response = if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses.front().cloned().unwrap()
        };
        response.map_err(Error::Extraction)
    }
}

// =============================================================================
// Setup helpers
// =============================================================================

struct TestApp {
    app: Router,
    cache: Arc<UrlCache>,
    shutdown_rx: mpsc::Receiver<()>,
}

fn track(source: Source, id: &str, title: &str) -> Track {
    Track {
        title: title.to_string(),
        artist: "Test Artist".to_string(),
        duration: 200,
        id: id.to_string(),
        url: format!("https://example.com/{}", id),
        thumbnail: None,
        source,
    }
}

async fn setup_app(
    providers: Vec<Arc<dyn SearchProvider>>,
    mix_provider: Arc<dyn SearchProvider>,
    resolver: Arc<dyn MediaResolver>,
) -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");
    db::create_schema(&pool).await.expect("Should create schema");

    let cache = Arc::new(UrlCache::new());
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

    // Port 1 is never serving: lyrics lookups fail fast as transport
    // errors unless a test overrides the endpoint
    let lyrics = Arc::new(LyricsClient::new("http://127.0.0.1:1/api/get").unwrap());

    let state = AppState::new(
        pool,
        Arc::clone(&cache),
        Arc::new(Aggregator::new(providers, mix_provider)),
        resolver,
        lyrics,
        reqwest::Client::new(),
        shutdown_tx,
        5000,
    );

    TestApp {
        app: build_router(state),
        cache,
        shutdown_rx,
    }
}

async fn default_app() -> TestApp {
    let youtube = MockProvider::returning(
        Source::Youtube,
        vec![
            track(Source::Youtube, "yt1", "Numb"),
            track(Source::Youtube, "yt2", "In the End"),
        ],
    );
    let jiosaavn = MockProvider::returning(
        Source::Jiosaavn,
        vec![
            track(Source::Jiosaavn, "js1", "Numb (Cover)"),
            track(Source::Jiosaavn, "js2", "Tum Hi Ho"),
        ],
    );
    setup_app(
        vec![youtube.clone(), jiosaavn],
        youtube,
        MockResolver::returning("http://127.0.0.1:1/unused"),
    )
    .await
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Serve a fixed byte payload on an ephemeral local port, returning the
/// URL
async fn spawn_upstream(payload: Vec<u8>) -> String {
    let app = Router::new().route(
        "/audio",
        get(move || {
            let payload = payload.clone();
            async move { payload }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/audio", addr)
}

/// A 127.0.0.1 URL nothing is listening on
async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/audio", addr)
}

// =============================================================================
// Health and status
// =============================================================================

#[tokio::test]
async fn health_endpoint_reports_module_and_version() {
    let test = default_app().await;
    let response = test.app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "nexus-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn status_endpoint_reports_online_and_cache_size() {
    let test = default_app().await;
    test.cache.insert("warm", "http://cdn/warm").await;

    let response = test.app.oneshot(get_request("/api/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "online");
    assert_eq!(body["cached_urls"], 1);
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn search_groups_results_by_provider_in_order() {
    let test = default_app().await;
    let response = test
        .app
        .oneshot(get_request("/api/search?q=Numb"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(body["count"], 4);

    let sources: Vec<&str> = results
        .iter()
        .map(|r| r["source"].as_str().unwrap())
        .collect();
    assert_eq!(sources, ["youtube", "youtube", "jiosaavn", "jiosaavn"]);
    for result in results {
        assert!(!result["title"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn search_without_query_is_a_client_error() {
    let test = default_app().await;
    let response = test
        .app
        .clone()
        .oneshot(get_request("/api/search"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());

    // Whitespace-only counts as missing too
    let response = test
        .app
        .oneshot(get_request("/api/search?q=%20%20"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failing_provider_degrades_to_remaining_results() {
    let youtube = MockProvider::failing(Source::Youtube);
    let jiosaavn = MockProvider::returning(
        Source::Jiosaavn,
        vec![track(Source::Jiosaavn, "js1", "Tum Hi Ho")],
    );
    let test = setup_app(
        vec![youtube.clone(), jiosaavn],
        youtube,
        MockResolver::returning("http://127.0.0.1:1/unused"),
    )
    .await;

    let response = test
        .app
        .oneshot(get_request("/api/search?q=anything"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["source"], "jiosaavn");
}

// =============================================================================
// Recommendations
// =============================================================================

#[tokio::test]
async fn recommend_filters_seed_track_by_exact_title() {
    let mix = MockProvider::returning(
        Source::Youtube,
        vec![
            track(Source::Youtube, "m1", "Numb"),
            track(Source::Youtube, "m2", "numb"),
            track(Source::Youtube, "m3", "Numb (Remix)"),
            track(Source::Youtube, "m4", "Faint"),
        ],
    );
    let test = setup_app(
        vec![mix.clone()],
        mix,
        MockResolver::returning("http://127.0.0.1:1/unused"),
    )
    .await;

    let response = test
        .app
        .oneshot(get_request("/api/recommend?artist=Linkin%20Park&track=Numb"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let titles: Vec<&str> = body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();

    // Exact match removed; different casing and suffixes pass through
    assert_eq!(titles, ["numb", "Numb (Remix)", "Faint"]);
}

// =============================================================================
// Streaming proxy
// =============================================================================

#[tokio::test]
async fn stream_without_url_is_a_client_error() {
    let test = default_app().await;
    let response = test.app.oneshot(get_request("/stream")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stream_relays_bytes_with_audio_content_type() {
    // More than two relay frames of recognizable bytes
    let payload: Vec<u8> = (0..RELAY_CHUNK_SIZE * 2 + 100)
        .map(|i| (i % 251) as u8)
        .collect();
    let upstream = spawn_upstream(payload.clone()).await;
    let resolver = MockResolver::returning(&upstream);

    let provider = MockProvider::returning(Source::Youtube, vec![]);
    let test = setup_app(vec![provider.clone()], provider, resolver).await;

    let response = test
        .app
        .oneshot(get_request("/stream?url=https://page/watch&id=t1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "audio/mpeg"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], &payload[..]);
}

#[tokio::test]
async fn second_stream_for_same_id_skips_extraction() {
    let upstream = spawn_upstream(b"audio-bytes".to_vec()).await;
    let resolver = MockResolver::returning(&upstream);

    let provider = MockProvider::returning(Source::Youtube, vec![]);
    let shared: Arc<dyn MediaResolver> = resolver.clone();
    let test = setup_app(vec![provider.clone()], provider, shared).await;

    for _ in 0..2 {
        let response = test
            .app
            .clone()
            .oneshot(get_request("/stream?url=https://page/watch&id=t1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(resolver.call_count(), 1);
    assert_eq!(test.cache.get("t1").await.as_deref(), Some(upstream.as_str()));
}

#[tokio::test]
async fn stale_cached_url_is_evicted_and_re_resolved_once() {
    let upstream = spawn_upstream(b"fresh-audio".to_vec()).await;
    let resolver = MockResolver::returning(&upstream);

    let provider = MockProvider::returning(Source::Youtube, vec![]);
    let shared: Arc<dyn MediaResolver> = resolver.clone();
    let test = setup_app(vec![provider.clone()], provider, shared).await;

    // Simulate an expired CDN URL left over from an earlier resolution
    let stale = dead_url().await;
    test.cache.insert("t1", stale).await;

    let response = test
        .app
        .oneshot(get_request("/stream?url=https://page/watch&id=t1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"fresh-audio");

    // Exactly one fresh extraction, and the cache now holds the live URL
    assert_eq!(resolver.call_count(), 1);
    assert_eq!(test.cache.get("t1").await.as_deref(), Some(upstream.as_str()));
}

#[tokio::test]
async fn extraction_failure_is_a_server_error_with_the_tool_message() {
    let resolver = MockResolver::failing("Video unavailable");
    let provider = MockProvider::returning(Source::Youtube, vec![]);
    let test = setup_app(vec![provider.clone()], provider, resolver).await;

    let response = test
        .app
        .oneshot(get_request("/stream?url=https://page/watch&id=t1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("Video unavailable"));
}

// =============================================================================
// Library
// =============================================================================

#[tokio::test]
async fn library_round_trip_with_idempotent_insert() {
    let test = default_app().await;
    let song = json!({
        "title": "Numb",
        "artist": "Linkin Park",
        "duration": 187,
        "id": "kXYiU_JCYtU",
        "url": "https://www.youtube.com/watch?v=kXYiU_JCYtU",
        "thumbnail": null,
        "source": "youtube"
    });

    for _ in 0..2 {
        let response = test
            .app
            .clone()
            .oneshot(json_request("POST", "/api/library", song.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["success"], true);
    }

    let response = test
        .app
        .clone()
        .oneshot(get_request("/api/library"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let library = body["library"].as_array().unwrap();
    assert_eq!(library.len(), 1);
    assert_eq!(library[0]["id"], "kXYiU_JCYtU");
    assert!(library[0]["added_at"].is_string());

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/library?id=kXYiU_JCYtU")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);

    let response = test.app.oneshot(get_request("/api/library")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["library"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn library_delete_without_id_is_a_client_error() {
    let test = default_app().await;
    let response = test
        .app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/library")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// History
// =============================================================================

#[tokio::test]
async fn history_records_and_lists_plays() {
    let test = default_app().await;
    let song = json!({
        "title": "Faint",
        "artist": "Linkin Park",
        "id": "faint01",
        "url": "https://www.youtube.com/watch?v=faint01",
        "source": "youtube"
    });

    let response = test
        .app
        .clone()
        .oneshot(json_request("POST", "/api/history", song))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test.app.oneshot(get_request("/api/history")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], "faint01");
    assert!(history[0]["played_at"].is_string());
}

// =============================================================================
// Playlists (end-to-end scenario)
// =============================================================================

#[tokio::test]
async fn duplicate_playlist_name_reports_structured_failure() {
    let test = default_app().await;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/playlists",
            json!({"name": "Road Trip"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["name"], "Road Trip");
    assert!(body["id"].is_number());

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/playlists",
            json!({"name": "Road Trip"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Playlist already exists");

    let response = test
        .app
        .oneshot(get_request("/api/playlists"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["playlists"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn playlist_membership_is_unique_per_playlist() {
    let test = default_app().await;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/playlists",
            json!({"name": "Workout"}),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let playlist_id = body["id"].as_i64().unwrap();

    let song = json!({
        "title": "Numb",
        "artist": "Linkin Park",
        "id": "kXYiU_JCYtU",
        "url": "https://www.youtube.com/watch?v=kXYiU_JCYtU",
        "source": "youtube"
    });

    let uri = format!("/api/playlists/{}/add", playlist_id);
    let response = test
        .app
        .clone()
        .oneshot(json_request("POST", &uri, song.clone()))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);

    let response = test
        .app
        .clone()
        .oneshot(json_request("POST", &uri, song))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Song already in playlist");

    let response = test
        .app
        .oneshot(get_request(&format!("/api/playlists/{}", playlist_id)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let songs = body["songs"].as_array().unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0]["title"], "Numb");
}

#[tokio::test]
async fn playlist_without_name_reports_structured_failure() {
    let test = default_app().await;
    let response = test
        .app
        .oneshot(json_request("POST", "/api/playlists", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Name required");
}

// =============================================================================
// Lyrics
// =============================================================================

#[tokio::test]
async fn lyrics_transport_failure_is_a_not_found_result() {
    let test = default_app().await;
    let response = test
        .app
        .oneshot(get_request("/api/lyrics?track=Numb&artist=Linkin%20Park"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["found"], false);
    assert!(body["error"].is_string());
}

// =============================================================================
// Party info and shutdown
// =============================================================================

#[tokio::test]
async fn party_info_advertises_a_joinable_url() {
    let test = default_app().await;
    let response = test
        .app
        .oneshot(get_request("/api/party_info"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["port"], 5000);
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("http://"));
    assert!(url.ends_with(":5000"));
}

#[tokio::test]
async fn shutdown_endpoint_signals_after_the_response_is_sent() {
    let mut test = default_app().await;

    let response = test
        .app
        .clone()
        .oneshot(json_request("POST", "/api/shutdown", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);

    // The response came back first; the signal follows on its timer
    let signalled = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        test.shutdown_rx.recv(),
    )
    .await;
    assert!(signalled.is_ok());
}
