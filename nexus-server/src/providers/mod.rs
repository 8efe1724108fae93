//! Provider adapters for the external music catalogs
//!
//! Each adapter performs one outbound call and returns normalized
//! [`Track`] records. A failed call is an error at this layer; the
//! aggregator logs it and treats the provider as having contributed
//! zero results.

pub mod jiosaavn;
pub mod lyrics;
pub mod soundcloud;
pub mod youtube;
pub mod ytdlp;

use async_trait::async_trait;
use nexus_common::{Result, Source, Track};

pub use jiosaavn::JioSaavnClient;
pub use lyrics::LyricsClient;
pub use soundcloud::SoundCloudSearch;
pub use youtube::YouTubeSearch;
pub use ytdlp::YtDlp;

/// Per-call configuration for the external extraction tool
///
/// Passed explicitly into every call rather than living in ambient
/// defaults, so search and resolution can diverge (flat metadata-only
/// search vs. full playback-info extraction).
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Result-count limit for search specs
    pub limit: usize,
    /// Flat extraction: lightweight metadata without playback info
    pub flat: bool,
    /// Suppress playlist expansion when a URL names one
    pub no_playlist: bool,
    /// Silence the tool's own progress output
    pub quiet: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            flat: true,
            no_playlist: true,
            quiet: true,
        }
    }
}

impl ExtractOptions {
    /// Options for the resolution path: full extraction, single item
    pub fn resolve() -> Self {
        Self {
            flat: false,
            ..Self::default()
        }
    }
}

/// A searchable external music catalog
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Tag stamped on every track this provider emits
    fn source(&self) -> Source;

    /// Result-count limit used when the caller has no preference
    fn default_limit(&self) -> usize {
        10
    }

    /// Search the catalog, returning normalized tracks
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>>;
}
