//! SoundCloud search adapter
//!
//! Same flat-search machinery as YouTube, via yt-dlp's `scsearchN:`
//! spec. Disabled by default; flat extraction against SoundCloud is the
//! slowest of the three providers.

use std::sync::Arc;

use async_trait::async_trait;
use nexus_common::{Error, Result, Source, Track};

use super::ytdlp::{FlatEntry, YtDlp};
use super::{ExtractOptions, SearchProvider};

pub struct SoundCloudSearch {
    ytdlp: Arc<YtDlp>,
}

impl SoundCloudSearch {
    pub fn new(ytdlp: Arc<YtDlp>) -> Self {
        Self { ytdlp }
    }
}

#[async_trait]
impl SearchProvider for SoundCloudSearch {
    fn source(&self) -> Source {
        Source::Soundcloud
    }

    fn default_limit(&self) -> usize {
        5
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>> {
        let options = ExtractOptions {
            limit,
            ..ExtractOptions::default()
        };
        let spec = format!("scsearch{}:{}", options.limit, query);
        let entries = self
            .ytdlp
            .flat_search(&spec, &options)
            .await
            .map_err(|e| Error::Provider(format!("SoundCloud search: {}", e)))?;

        Ok(entries.into_iter().filter_map(flat_entry_to_track).collect())
    }
}

/// Normalize a flat entry; the uploader is usually the artist
fn flat_entry_to_track(entry: FlatEntry) -> Option<Track> {
    let title = entry.title.filter(|t| !t.is_empty())?;
    let url = entry.url.filter(|u| !u.is_empty())?;

    Some(Track {
        title,
        artist: entry
            .uploader
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        duration: entry.duration.map(|d| d.max(0.0) as u64).unwrap_or(0),
        id: entry.id.unwrap_or_default(),
        url,
        // Flat mode rarely carries SoundCloud artwork, but keep it when
        // present
        thumbnail: entry.thumbnail,
        source: Source::Soundcloud,
    })
}
