//! Wrapper around the external yt-dlp executable
//!
//! yt-dlp is the black-box media extractor behind YouTube and SoundCloud
//! search and behind direct-URL resolution for streaming. It is driven
//! through its CLI: flat searches dump a single JSON document, URL
//! resolution prints the chosen format's direct URL.

use serde::Deserialize;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use super::ExtractOptions;

/// yt-dlp invocation errors
#[derive(Debug, Error)]
pub enum YtDlpError {
    /// Binary missing from PATH or not executable
    #[error("Failed to execute yt-dlp: {0}")]
    Spawn(String),

    /// Tool ran but reported failure
    #[error("yt-dlp failed: {0}")]
    Failed(String),

    /// Output was not the expected JSON or URL
    #[error("Failed to parse yt-dlp output: {0}")]
    Parse(String),
}

/// One entry of a flat search dump
///
/// Everything is optional; normalization decides what survives.
#[derive(Debug, Clone, Deserialize)]
pub struct FlatEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub duration: Option<f64>,
    pub channel: Option<String>,
    pub uploader: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchDump {
    entries: Option<Vec<FlatEntry>>,
}

/// Handle on the external yt-dlp executable
pub struct YtDlp {
    bin: String,
}

impl YtDlp {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Run a flat search spec (e.g. `ytsearch5:query`) and return its
    /// entries
    pub async fn flat_search(
        &self,
        search_spec: &str,
        options: &ExtractOptions,
    ) -> Result<Vec<FlatEntry>, YtDlpError> {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("--dump-single-json")
            .arg("--skip-download")
            .arg("--no-warnings");
        if options.flat {
            cmd.arg("--flat-playlist");
        }
        if options.no_playlist {
            cmd.arg("--no-playlist");
        }
        if options.quiet {
            cmd.arg("--quiet");
        }
        cmd.arg(search_spec);

        debug!(spec = %search_spec, "Running yt-dlp flat search");
        let stdout = self.run(cmd).await?;

        let dump: SearchDump =
            serde_json::from_slice(&stdout).map_err(|e| YtDlpError::Parse(e.to_string()))?;
        Ok(dump.entries.unwrap_or_default())
    }

    /// Resolve a page URL to the best-available audio-only direct URL
    pub async fn resolve_audio_url(
        &self,
        page_url: &str,
        options: &ExtractOptions,
    ) -> Result<String, YtDlpError> {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("--get-url")
            .arg("--format")
            .arg("bestaudio/best")
            .arg("--no-warnings");
        if options.no_playlist {
            cmd.arg("--no-playlist");
        }
        if options.quiet {
            cmd.arg("--quiet");
        }
        cmd.arg(page_url);

        debug!(url = %page_url, "Resolving direct audio URL");
        let stdout = self.run(cmd).await?;

        let text = String::from_utf8_lossy(&stdout);
        let url = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| YtDlpError::Parse("empty output".to_string()))?;
        Ok(url.to_string())
    }

    async fn run(&self, mut cmd: Command) -> Result<Vec<u8>, YtDlpError> {
        let output = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| YtDlpError::Spawn(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .last()
                .unwrap_or("unknown error")
                .to_string();
            return Err(YtDlpError::Failed(message));
        }

        Ok(output.stdout)
    }
}
