//! YouTube search adapter
//!
//! Flat search through yt-dlp's `ytsearchN:` spec. Flat entries carry
//! metadata only; the direct URL is resolved later by the streaming
//! path.

use std::sync::Arc;

use async_trait::async_trait;
use nexus_common::{Error, Result, Source, Track};

use super::ytdlp::{FlatEntry, YtDlp};
use super::{ExtractOptions, SearchProvider};

pub struct YouTubeSearch {
    ytdlp: Arc<YtDlp>,
}

impl YouTubeSearch {
    pub fn new(ytdlp: Arc<YtDlp>) -> Self {
        Self { ytdlp }
    }
}

#[async_trait]
impl SearchProvider for YouTubeSearch {
    fn source(&self) -> Source {
        Source::Youtube
    }

    fn default_limit(&self) -> usize {
        5
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>> {
        let options = ExtractOptions {
            limit,
            ..ExtractOptions::default()
        };
        let spec = format!("ytsearch{}:{}", options.limit, query);
        let entries = self
            .ytdlp
            .flat_search(&spec, &options)
            .await
            .map_err(|e| Error::Provider(format!("YouTube search: {}", e)))?;

        Ok(entries.into_iter().filter_map(flat_entry_to_track).collect())
    }
}

/// Normalize a flat entry; entries without a title are dropped
fn flat_entry_to_track(entry: FlatEntry) -> Option<Track> {
    let title = entry.title.filter(|t| !t.is_empty())?;
    let id = entry.id.unwrap_or_default();
    // YouTube often puts the artist in the channel name
    let artist = entry
        .channel
        .or(entry.uploader)
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    let url = entry
        .url
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={}", id));

    Some(Track {
        title,
        artist,
        duration: entry.duration.map(|d| d.max(0.0) as u64).unwrap_or(0),
        id,
        url,
        thumbnail: entry.thumbnail,
        source: Source::Youtube,
    })
}
