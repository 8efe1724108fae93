//! Nexus - personal music aggregation server
//!
//! One binary serves the whole system: multi-provider search, mix
//! recommendations, the streaming proxy with its resolution cache,
//! lyrics lookup, and the library/playlist store.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nexus_common::config::{FileConfig, ServerConfig};
use nexus_common::db;
use nexus_server::providers::{
    JioSaavnClient, LyricsClient, SearchProvider, SoundCloudSearch, YouTubeSearch, YtDlp,
};
use nexus_server::search::Aggregator;
use nexus_server::stream::{UrlCache, YtDlpResolver};
use nexus_server::{build_router, AppState};

/// Command-line arguments for nexus-server
#[derive(Parser, Debug)]
#[command(name = "nexus-server")]
#[command(about = "Personal music aggregation server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "NEXUS_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "NEXUS_BIND")]
    bind: Option<String>,

    /// SQLite database file
    #[arg(short, long, env = "NEXUS_DATABASE")]
    database: Option<PathBuf>,

    /// Name or path of the yt-dlp executable
    #[arg(long, env = "NEXUS_YTDLP")]
    ytdlp: Option<String>,

    /// Config file (defaults to <config dir>/nexus/config.toml)
    #[arg(short, long, env = "NEXUS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable the SoundCloud provider (slow)
    #[arg(long, env = "NEXUS_ENABLE_SOUNDCLOUD")]
    enable_soundcloud: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nexus_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting Nexus v{}", env!("CARGO_PKG_VERSION"));

    let file_config = match &args.config {
        Some(path) => FileConfig::load(path).context("Failed to load config file")?,
        None => FileConfig::load_default_location().context("Failed to load config file")?,
    };
    let config = ServerConfig::resolve(
        file_config,
        args.bind,
        args.port,
        args.database,
        args.ytdlp,
        args.enable_soundcloud,
    );

    info!("Database path: {}", config.database_path.display());
    let pool = db::init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    // Provider adapters; the aggregator treats each as optional at
    // request time, so construction failures are fatal config errors
    let ytdlp = Arc::new(YtDlp::new(config.ytdlp_bin.clone()));
    let youtube: Arc<dyn SearchProvider> = Arc::new(YouTubeSearch::new(Arc::clone(&ytdlp)));
    let jiosaavn: Arc<dyn SearchProvider> = Arc::new(
        JioSaavnClient::new(config.jiosaavn_endpoint.clone())
            .context("Failed to build JioSaavn client")?,
    );

    let mut providers = vec![Arc::clone(&youtube), jiosaavn];
    if config.enable_soundcloud {
        info!("SoundCloud provider enabled");
        providers.push(Arc::new(SoundCloudSearch::new(Arc::clone(&ytdlp))));
    }
    let aggregator = Arc::new(Aggregator::new(providers, youtube));

    let lyrics_client = Arc::new(
        LyricsClient::new(config.lrclib_endpoint.clone())
            .context("Failed to build lyrics client")?,
    );

    // Relay client: connect timeout only; audio streams are long-lived
    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

    let state = AppState::new(
        pool,
        Arc::new(UrlCache::new()),
        aggregator,
        Arc::new(YtDlpResolver::new(ytdlp)),
        lyrics_client,
        http,
        shutdown_tx,
        config.port,
    );
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port)
        .parse()
        .context("Invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Nexus listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown on Ctrl+C, SIGTERM, or the sleep-timer endpoint
async fn shutdown_signal(mut requested: mpsc::Receiver<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
        _ = requested.recv() => {
            info!("Shutdown requested via API");
        },
    }
}
