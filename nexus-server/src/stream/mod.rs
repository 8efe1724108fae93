//! Streaming resolution and relay
//!
//! Turning a provider page URL into playable bytes happens in two
//! steps: resolve a direct audio URL (cache hit, else on-demand
//! extraction) and relay the remote bytes to the caller re-chunked into
//! fixed-size frames. The caller dropping the response drops the relay
//! stream, which cancels the upstream request.

pub mod cache;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use nexus_common::{Error, Result};
use tracing::{debug, info};

use crate::providers::{ExtractOptions, YtDlp};

pub use cache::UrlCache;

/// Relay frame size
pub const RELAY_CHUNK_SIZE: usize = 32 * 1024;

/// On-demand extraction of a direct audio URL from a provider page URL
///
/// Seam for the external extraction tool so the streaming path can be
/// tested without it.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, page_url: &str, options: &ExtractOptions) -> Result<String>;
}

/// Production resolver backed by the yt-dlp executable
pub struct YtDlpResolver {
    ytdlp: Arc<YtDlp>,
}

impl YtDlpResolver {
    pub fn new(ytdlp: Arc<YtDlp>) -> Self {
        Self { ytdlp }
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    async fn resolve(&self, page_url: &str, options: &ExtractOptions) -> Result<String> {
        self.ytdlp
            .resolve_audio_url(page_url, options)
            .await
            .map_err(|e| Error::Extraction(e.to_string()))
    }
}

/// Outcome of [`resolve_stream_url`]
pub struct StreamResolution {
    pub url: String,
    /// True when the URL came from the cache without extraction
    pub from_cache: bool,
}

/// Resolve the direct audio URL for a track
///
/// Cache hit skips extraction entirely; a miss extracts on demand and
/// populates the cache under the track id when one was given.
pub async fn resolve_stream_url(
    cache: &UrlCache,
    resolver: &dyn MediaResolver,
    page_url: &str,
    track_id: Option<&str>,
) -> Result<StreamResolution> {
    if let Some(id) = track_id {
        if let Some(url) = cache.get(id).await {
            debug!(id = %id, "Cache hit, skipping extraction");
            return Ok(StreamResolution {
                url,
                from_cache: true,
            });
        }
        debug!(id = %id, "Cache miss, resolving");
    }

    let url = resolver
        .resolve(page_url, &ExtractOptions::resolve())
        .await?;

    if let Some(id) = track_id {
        cache.insert(id, url.as_str()).await;
        info!(id = %id, "Cached resolved URL");
    }

    Ok(StreamResolution {
        url,
        from_cache: false,
    })
}

/// Re-chunk an upstream byte stream into fixed-size relay frames
///
/// Frames are exactly [`RELAY_CHUNK_SIZE`] bytes except the final
/// remainder. An upstream error ends the stream with an IO error after
/// whatever complete frames were already relayed.
pub fn rechunk<S>(upstream: S) -> impl Stream<Item = std::io::Result<Bytes>> + Send
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    async_stream::try_stream! {
        let mut upstream = std::pin::pin!(upstream);
        let mut buffer = BytesMut::with_capacity(RELAY_CHUNK_SIZE * 2);

        while let Some(chunk) = upstream.next().await {
            let chunk = chunk
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            buffer.extend_from_slice(&chunk);
            while buffer.len() >= RELAY_CHUNK_SIZE {
                yield buffer.split_to(RELAY_CHUNK_SIZE).freeze();
            }
        }

        if !buffer.is_empty() {
            yield buffer.split().freeze();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn collect_sizes(chunks: Vec<Bytes>) -> Vec<usize> {
        chunks.iter().map(|c| c.len()).collect()
    }

    #[tokio::test]
    async fn rechunk_emits_fixed_frames_with_remainder() {
        // 2.5 frames arriving in awkward pieces
        let total = RELAY_CHUNK_SIZE * 2 + RELAY_CHUNK_SIZE / 2;
        let data = vec![0xABu8; total];
        let pieces: Vec<reqwest::Result<Bytes>> = data
            .chunks(10_000)
            .map(|piece| Ok(Bytes::copy_from_slice(piece)))
            .collect();

        let frames: Vec<Bytes> = rechunk(stream::iter(pieces))
            .map(|frame| frame.unwrap())
            .collect()
            .await;

        assert_eq!(
            collect_sizes(frames.clone()),
            vec![RELAY_CHUNK_SIZE, RELAY_CHUNK_SIZE, RELAY_CHUNK_SIZE / 2]
        );
        let relayed: usize = frames.iter().map(|f| f.len()).sum();
        assert_eq!(relayed, total);
    }

    #[tokio::test]
    async fn rechunk_passes_small_streams_through() {
        let pieces: Vec<reqwest::Result<Bytes>> =
            vec![Ok(Bytes::from_static(b"id3-header-and-a-bit-of-audio"))];
        let frames: Vec<Bytes> = rechunk(stream::iter(pieces))
            .map(|frame| frame.unwrap())
            .collect()
            .await;
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], b"id3-header-and-a-bit-of-audio");
    }

    struct CountingResolver {
        url: String,
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl MediaResolver for CountingResolver {
        async fn resolve(&self, _page_url: &str, _options: &ExtractOptions) -> Result<String> {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(self.url.clone())
        }
    }

    #[tokio::test]
    async fn second_resolution_hits_cache_without_extraction() {
        let cache = UrlCache::new();
        let resolver = CountingResolver {
            url: "https://cdn.example/audio".to_string(),
            calls: std::sync::atomic::AtomicUsize::new(0),
        };

        let first = resolve_stream_url(&cache, &resolver, "https://page/watch", Some("track1"))
            .await
            .unwrap();
        assert!(!first.from_cache);

        let second = resolve_stream_url(&cache, &resolver, "https://page/watch", Some("track1"))
            .await
            .unwrap();
        assert!(second.from_cache);
        assert_eq!(second.url, first.url);
        assert_eq!(resolver.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resolution_without_id_never_caches() {
        let cache = UrlCache::new();
        let resolver = CountingResolver {
            url: "https://cdn.example/audio".to_string(),
            calls: std::sync::atomic::AtomicUsize::new(0),
        };

        resolve_stream_url(&cache, &resolver, "https://page/watch", None)
            .await
            .unwrap();
        resolve_stream_url(&cache, &resolver, "https://page/watch", None)
            .await
            .unwrap();

        assert!(cache.is_empty().await);
        assert_eq!(resolver.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
