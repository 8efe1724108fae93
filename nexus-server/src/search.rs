//! Multi-provider search aggregation and mix recommendations

use std::sync::Arc;

use futures::future::join_all;
use nexus_common::{Error, Result, Track};
use tracing::{debug, warn};

use crate::providers::SearchProvider;

/// Result count requested from the seed provider for a mix
const MIX_LIMIT: usize = 5;

/// Fans a query out to the enabled providers and concatenates their
/// results in provider order
///
/// Provider failures never fail a search; they contribute zero results.
pub struct Aggregator {
    providers: Vec<Arc<dyn SearchProvider>>,
    /// Seed provider for recommendations; its related-content ranking
    /// is the best of the three
    mix_provider: Arc<dyn SearchProvider>,
}

impl Aggregator {
    pub fn new(
        providers: Vec<Arc<dyn SearchProvider>>,
        mix_provider: Arc<dyn SearchProvider>,
    ) -> Self {
        Self {
            providers,
            mix_provider,
        }
    }

    /// Search every enabled provider concurrently
    ///
    /// Waits for all providers; results keep provider order with no
    /// interleaving or cross-provider ranking. Fails only on an empty
    /// query.
    pub async fn search(&self, query: &str) -> Result<Vec<Track>> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("No query".to_string()));
        }

        debug!(query = %query, providers = self.providers.len(), "Searching");

        let calls = self
            .providers
            .iter()
            .map(|provider| self.call_provider(provider.as_ref(), query, provider.default_limit()));
        let per_provider = join_all(calls).await;

        Ok(per_provider.into_iter().flatten().collect())
    }

    /// Generate a mix for a seed artist/track
    ///
    /// Piggybacks on the seed provider's related-content logic by
    /// searching `"<artist> <track> Mix"` and dropping the seed track
    /// itself (exact title match only; remixes and re-casings pass).
    pub async fn recommend(&self, seed_artist: &str, seed_track: &str) -> Vec<Track> {
        let query = format!("{} {} Mix", seed_artist, seed_track);
        debug!(query = %query, "Generating mix recommendations");

        let results = self
            .call_provider(self.mix_provider.as_ref(), &query, MIX_LIMIT)
            .await;

        results
            .into_iter()
            .filter(|track| track.title != seed_track)
            .collect()
    }

    /// One provider call; errors are logged and degrade to empty
    async fn call_provider(
        &self,
        provider: &dyn SearchProvider,
        query: &str,
        limit: usize,
    ) -> Vec<Track> {
        match provider.search(query, limit).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(source = %provider.source(), "Provider search failed: {}", e);
                Vec::new()
            }
        }
    }
}
