//! In-memory location cache.
//!
//! Results are keyed by the trimmed query text and live as long as the cache
//! does. Clones share the same storage via `Arc<RwLock<>>`, so one cache can be
//! handed to several services or inspected from tests and telemetry.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::types::Location;

/// Unbounded query -> locations map shared across clones.
///
/// There is no eviction and no TTL. Keys are stored exactly as given, so
/// `"lausanne"` and `"Lausanne"` are distinct entries.
#[derive(Clone, Default)]
pub struct LocationCache {
    inner: Arc<RwLock<HashMap<String, Vec<Location>>>>,
}

impl LocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previous result (read lock, concurrent with other readers).
    pub async fn get(&self, key: &str) -> Option<Vec<Location>> {
        self.inner.read().await.get(key).cloned()
    }

    /// Store a result, replacing whatever was there.
    pub async fn insert(&self, key: impl Into<String>, locations: Vec<Location>) {
        self.inner.write().await.insert(key.into(), locations);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Drop every cached result.
    ///
    /// Nothing in the crate calls this on its own; it is a hook for embedders
    /// that share a cache between services, and for tests.
    pub async fn invalidate(&self) {
        let mut cache = self.inner.write().await;
        tracing::debug!(entries = cache.len(), "invalidating location cache");
        cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lausanne() -> Vec<Location> {
        vec![Location::new("1000", "Lausanne", Some("VD".to_string()))]
    }

    #[tokio::test]
    async fn test_cache_creation() {
        let cache = LocationCache::new();
        assert!(cache.is_empty().await);
        assert!(cache.get("Lausanne").await.is_none());
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = LocationCache::new();
        cache.insert("Lausanne", lausanne()).await;

        assert_eq!(cache.get("Lausanne").await, Some(lausanne()));
        assert_eq!(cache.len().await, 1);
        // No normalization beyond what the caller did
        assert!(cache.get("lausanne").await.is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let cache = LocationCache::new();
        cache.insert("1000", lausanne()).await;
        cache.insert("1000", Vec::new()).await;

        assert_eq!(cache.get("1000").await, Some(Vec::new()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache = LocationCache::new();
        let other = cache.clone();
        other.insert("Lausanne", lausanne()).await;

        assert_eq!(cache.get("Lausanne").await, Some(lausanne()));
    }

    #[tokio::test]
    async fn test_invalidation() {
        let cache = LocationCache::new();

        // Invalidate should succeed even if cache is empty
        cache.invalidate().await;

        cache.insert("Lausanne", lausanne()).await;
        cache.invalidate().await;
        assert!(cache.is_empty().await);
    }
}
