//! Configuration loading and resolution
//!
//! Settings resolve in priority order: command-line argument, environment
//! variable, TOML config file, compiled default. The CLI/env tiers are
//! handled by the binary's clap definition; this module owns the file and
//! default tiers and the merged [`ServerConfig`] the server runs with.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Effective server configuration after all tiers are merged
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind, e.g. "0.0.0.0"
    pub bind: String,
    pub port: u16,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Name or path of the external media extraction executable
    pub ytdlp_bin: String,
    /// JioSaavn search API endpoint
    pub jiosaavn_endpoint: String,
    /// LRCLIB lyrics API endpoint
    pub lrclib_endpoint: String,
    /// SoundCloud search is off by default; flat extraction through the
    /// external tool is noticeably slower than the other providers
    pub enable_soundcloud: bool,
}

/// Optional overrides read from the TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub ytdlp_bin: Option<String>,
    pub jiosaavn_endpoint: Option<String>,
    pub lrclib_endpoint: Option<String>,
    pub enable_soundcloud: Option<bool>,
}

impl FileConfig {
    /// Load `<config dir>/nexus/config.toml` if it exists
    pub fn load_default_location() -> Result<FileConfig> {
        let Some(path) = dirs::config_dir().map(|d| d.join("nexus").join("config.toml")) else {
            return Ok(FileConfig::default());
        };
        if !path.exists() {
            return Ok(FileConfig::default());
        }
        Self::load(&path)
    }

    pub fn load(path: &std::path::Path) -> Result<FileConfig> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }
}

impl ServerConfig {
    /// Merge CLI/env values (already resolved by clap) over the config
    /// file, over compiled defaults
    pub fn resolve(
        file: FileConfig,
        bind: Option<String>,
        port: Option<u16>,
        database_path: Option<PathBuf>,
        ytdlp_bin: Option<String>,
        enable_soundcloud: bool,
    ) -> ServerConfig {
        ServerConfig {
            bind: bind.or(file.bind).unwrap_or_else(|| "0.0.0.0".to_string()),
            port: port.or(file.port).unwrap_or(5000),
            database_path: database_path
                .or(file.database_path)
                .unwrap_or_else(default_database_path),
            ytdlp_bin: ytdlp_bin
                .or(file.ytdlp_bin)
                .unwrap_or_else(|| "yt-dlp".to_string()),
            jiosaavn_endpoint: file
                .jiosaavn_endpoint
                .unwrap_or_else(|| "https://www.jiosaavn.com/api.php".to_string()),
            lrclib_endpoint: file
                .lrclib_endpoint
                .unwrap_or_else(|| "https://lrclib.net/api/get".to_string()),
            enable_soundcloud: enable_soundcloud || file.enable_soundcloud.unwrap_or(false),
        }
    }
}

/// Default database location: `<data dir>/nexus/nexus.db`
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("nexus"))
        .unwrap_or_else(|| PathBuf::from("./nexus_data"))
        .join("nexus.db")
}
