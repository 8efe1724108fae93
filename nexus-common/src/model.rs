//! Track data model shared by search, streaming, and storage

use serde::{Deserialize, Serialize};

/// Provider that produced a track record
///
/// The tag determines which resolution path applies when the track is
/// later streamed: JioSaavn URLs resolve through the extractor like the
/// others, but SoundCloud flat results may already carry a direct URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Youtube,
    Jiosaavn,
    Soundcloud,
}

impl Source {
    /// Stable lowercase tag, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Youtube => "youtube",
            Source::Jiosaavn => "jiosaavn",
            Source::Soundcloud => "soundcloud",
        }
    }

    /// Parse a stored tag back into a source
    pub fn parse(tag: &str) -> Option<Source> {
        match tag {
            "youtube" => Some(Source::Youtube),
            "jiosaavn" => Some(Source::Jiosaavn),
            "soundcloud" => Some(Source::Soundcloud),
            _ => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized search result, immutable once an adapter emits it
///
/// Tracks are only filtered or stored verbatim downstream; nothing merges
/// or mutates them. `id` is provider-scoped; uniqueness across providers
/// is not guaranteed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    #[serde(default = "unknown_artist")]
    pub artist: String,
    /// Duration in seconds, 0 when the provider did not report one
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub source: Source,
}

fn unknown_artist() -> String {
    "Unknown".to_string()
}

/// Lyrics lookup outcome
///
/// `synced` holds LRC line-timestamped text when the provider has it.
/// A failed lookup is a valid outcome: `found` is false and `error`
/// carries a human-readable reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LyricsResult {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LyricsResult {
    pub fn not_found(error: impl Into<String>) -> Self {
        Self {
            found: false,
            plain: None,
            synced: None,
            error: Some(error.into()),
        }
    }
}
