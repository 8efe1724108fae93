//! JioSaavn search adapter
//!
//! Direct HTTP client against the catalog's JSON search API. The only
//! provider that needs no extraction tool: results arrive as typed JSON.

use std::time::Duration;

use async_trait::async_trait;
use nexus_common::{Error, Result, Source, Track};
use serde::Deserialize;
use tracing::debug;

use super::SearchProvider;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SaavnSong>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaavnSong {
    pub id: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image: Option<String>,
    pub perma_url: Option<String>,
    #[serde(default)]
    pub more_info: SaavnMoreInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaavnMoreInfo {
    /// Duration in seconds, as a decimal string
    pub duration: Option<String>,
    #[serde(rename = "artistMap")]
    pub artist_map: Option<SaavnArtistMap>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaavnArtistMap {
    #[serde(default)]
    pub primary_artists: Vec<SaavnArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaavnArtist {
    pub name: Option<String>,
}

pub struct JioSaavnClient {
    http: reqwest::Client,
    endpoint: String,
}

impl JioSaavnClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .map_err(|e| Error::Provider(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SearchProvider for JioSaavnClient {
    fn source(&self) -> Source {
        Source::Jiosaavn
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>> {
        debug!(query = %query, "Querying JioSaavn search API");
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("__call", "search.getResults"),
                ("_format", "json"),
                ("_marker", "0"),
                ("api_version", "4"),
                ("p", "1"),
                ("n", &limit.to_string()),
                ("q", query),
            ])
            .send()
            .await
            .map_err(|e| Error::Provider(format!("JioSaavn search: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "JioSaavn search: HTTP {}",
                response.status()
            )));
        }

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("JioSaavn response: {}", e)))?;

        Ok(data.results.into_iter().filter_map(song_to_track).collect())
    }
}

/// Normalize one catalog song; songs without a title are dropped
fn song_to_track(song: SaavnSong) -> Option<Track> {
    let title = song.title.filter(|t| !t.is_empty())?;

    // Primary artist, then the subtitle line, then "Unknown"
    let artist = song
        .more_info
        .artist_map
        .as_ref()
        .and_then(|map| map.primary_artists.first())
        .and_then(|a| a.name.clone())
        .or(song.subtitle)
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    let duration = song
        .more_info
        .duration
        .as_deref()
        .and_then(|d| d.parse::<u64>().ok())
        .unwrap_or(0);

    // The API hands out 150x150 artwork; the player wants the 500x500
    // rendition the CDN also serves
    let thumbnail = song.image.map(|img| img.replace("150x150", "500x500"));

    Some(Track {
        title,
        artist,
        duration,
        id: song.id.unwrap_or_default(),
        url: song.perma_url.unwrap_or_default(),
        thumbnail,
        source: Source::Jiosaavn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "results": [
            {
                "id": "5WXAlMNt",
                "title": "Tum Hi Ho",
                "subtitle": "Mithoon, Arijit Singh - Aashiqui 2",
                "image": "https://c.saavncdn.com/album_150x150.jpg",
                "perma_url": "https://www.jiosaavn.com/song/tum-hi-ho/RT8zfBNpXxs",
                "more_info": {
                    "duration": "262",
                    "artistMap": {
                        "primary_artists": [{"name": "Arijit Singh"}]
                    }
                }
            },
            {
                "id": "noTitle",
                "subtitle": "Should be skipped"
            },
            {
                "id": "subOnly",
                "title": "Subtitle Fallback",
                "subtitle": "Some Artist - Some Album",
                "more_info": {"duration": "not-a-number"}
            }
        ]
    }"#;

    #[test]
    fn normalizes_artist_thumbnail_and_duration() {
        let response: SearchResponse = serde_json::from_str(SAMPLE).unwrap();
        let tracks: Vec<Track> = response
            .results
            .into_iter()
            .filter_map(song_to_track)
            .collect();

        assert_eq!(tracks.len(), 2);

        assert_eq!(tracks[0].artist, "Arijit Singh");
        assert_eq!(tracks[0].duration, 262);
        assert_eq!(
            tracks[0].thumbnail.as_deref(),
            Some("https://c.saavncdn.com/album_500x500.jpg")
        );
        assert_eq!(tracks[0].source, Source::Jiosaavn);

        // No artist map: subtitle stands in; bad duration becomes 0
        assert_eq!(tracks[1].artist, "Some Artist - Some Album");
        assert_eq!(tracks[1].duration, 0);
    }
}
