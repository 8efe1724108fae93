//! LRCLIB lyrics adapter
//!
//! Single GET per lookup with a short timeout. A miss or a transport
//! failure is a valid outcome (`found: false`), never retried.

use std::time::Duration;

use nexus_common::{Error, LyricsResult, Result};
use serde::Deserialize;
use tracing::debug;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LrclibResponse {
    plain_lyrics: Option<String>,
    synced_lyrics: Option<String>,
}

pub struct LyricsClient {
    http: reqwest::Client,
    endpoint: String,
}

impl LyricsClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .map_err(|e| Error::Provider(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Look up lyrics by track and artist; duration narrows the match
    /// when the caller knows it
    pub async fn lookup(
        &self,
        track: &str,
        artist: &str,
        duration: Option<u64>,
    ) -> LyricsResult {
        debug!(track = %track, artist = %artist, "Looking up lyrics");

        let mut request = self
            .http
            .get(&self.endpoint)
            .query(&[("track_name", track), ("artist_name", artist)]);
        if let Some(duration) = duration {
            request = request.query(&[("duration", duration.to_string())]);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return LyricsResult::not_found(e.to_string()),
        };

        if !response.status().is_success() {
            return LyricsResult::not_found("Lyrics not found");
        }

        match response.json::<LrclibResponse>().await {
            Ok(data) => LyricsResult {
                found: true,
                plain: data.plain_lyrics,
                synced: data.synced_lyrics,
                error: None,
            },
            Err(e) => LyricsResult::not_found(e.to_string()),
        }
    }
}
