//! Direct-URL resolution cache
//!
//! Process-lifetime map from provider track id to the last-resolved
//! direct audio URL. Repeat plays of the same track skip extraction
//! entirely. Entries are overwritten on re-resolution and evicted only
//! by the relay-failure path; there is no TTL and no size bound (the
//! cache is injected state, so adding one later won't touch call
//! sites).

use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct UrlCache {
    inner: RwLock<HashMap<String, String>>,
}

impl UrlCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, track_id: &str) -> Option<String> {
        self.inner.read().await.get(track_id).cloned()
    }

    /// Insert or overwrite; concurrent writers race benignly (last
    /// writer wins)
    pub async fn insert(&self, track_id: impl Into<String>, url: impl Into<String>) {
        self.inner.write().await.insert(track_id.into(), url.into());
    }

    pub async fn remove(&self, track_id: &str) {
        self.inner.write().await.remove(track_id);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
