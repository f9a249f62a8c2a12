//! Location search service.
//!
//! Resolves free-text queries into short lists of candidate locations for
//! address autocompletion. Results are cached per trimmed query for the
//! lifetime of the injected [`LocationCache`]; failed lookups are never cached.
//!
//! Concurrent callers asking for the same key share one in-flight request
//! instead of each hitting the provider.

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::Mutex;

use crate::cache::LocationCache;
use crate::error::SearchError;
use crate::provider::LocalityProvider;
use crate::types::{LocalityQuery, Location, parse_localities};

type PendingLookup = Shared<BoxFuture<'static, Result<Vec<Location>, SearchError>>>;

/// Outcome of a lookup, before failures are flattened into an empty list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Served from the cache, no provider call
    Cached(Vec<Location>),
    /// Fetched from the provider (or joined an in-flight fetch) and cached
    Fetched(Vec<Location>),
    /// Provider call or response validation failed; nothing was cached
    Failed(SearchError),
}

impl Lookup {
    pub fn locations(&self) -> &[Location] {
        match self {
            Self::Cached(locations) | Self::Fetched(locations) => locations,
            Self::Failed(_) => &[],
        }
    }

    /// The user-facing result: failures become "no matches"
    pub fn into_locations(self) -> Vec<Location> {
        match self {
            Self::Cached(locations) | Self::Fetched(locations) => locations,
            Self::Failed(_) => Vec::new(),
        }
    }

    pub fn error(&self) -> Option<&SearchError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached(_))
    }
}

/// Cached location search over a [`LocalityProvider`].
///
/// Clones share the provider, the cache and the in-flight registry.
#[derive(Clone)]
pub struct LocationSearch {
    provider: Arc<dyn LocalityProvider>,
    cache: LocationCache,
    in_flight: Arc<Mutex<HashMap<String, PendingLookup>>>,
}

impl LocationSearch {
    pub fn new(provider: Arc<dyn LocalityProvider>, cache: LocationCache) -> Self {
        Self {
            provider,
            cache,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Service with its own, empty cache
    pub fn with_provider(provider: impl LocalityProvider + 'static) -> Self {
        Self::new(Arc::new(provider), LocationCache::new())
    }

    pub fn cache(&self) -> &LocationCache {
        &self.cache
    }

    /// Search locations for `query`, never failing.
    ///
    /// Failures are logged and reported as an empty list; use [`Self::lookup`]
    /// to tell "no matches" apart from "lookup failed".
    pub async fn search_locations(&self, query: &str) -> Vec<Location> {
        self.lookup(query).await.into_locations()
    }

    /// Search locations for `query` and report where the answer came from.
    pub async fn lookup(&self, query: &str) -> Lookup {
        let key = query.trim();

        if let Some(hit) = self.cache.get(key).await {
            tracing::debug!(q = key, results = hit.len(), "location cache hit");
            return Lookup::Cached(hit);
        }

        let pending = {
            let mut in_flight = self.in_flight.lock().await;

            // Double-check: the fetch for this key may have finished while we waited.
            // Fetches write the cache before leaving the registry.
            if let Some(hit) = self.cache.get(key).await {
                return Lookup::Cached(hit);
            }

            match in_flight.get(key) {
                Some(pending) => {
                    tracing::debug!(q = key, "joining in-flight location lookup");
                    pending.clone()
                }
                None => {
                    let pending = self.fetch(key.to_string());
                    in_flight.insert(key.to_string(), pending.clone());
                    pending
                }
            }
        }; // Lock released here

        match pending.await {
            Ok(locations) => Lookup::Fetched(locations),
            Err(error) => {
                tracing::warn!(q = key, %error, "location lookup failed");
                Lookup::Failed(error)
            }
        }
    }

    /// One provider round trip for `key`, shared by every caller that joins it.
    ///
    /// The round trip runs on its own task, so it completes (and leaves the
    /// in-flight registry) even if every caller awaiting it is dropped.
    fn fetch(&self, key: String) -> PendingLookup {
        let provider = Arc::clone(&self.provider);
        let cache = self.cache.clone();
        let in_flight = Arc::clone(&self.in_flight);

        let task = tokio::spawn(async move {
            let query = LocalityQuery::new(key.clone());
            tracing::debug!(q = %query.text, kind = %query.kind, "location cache miss");

            let result = match provider.search(&query).await {
                Ok(body) => parse_localities(&body),
                Err(e) => Err(e),
            };

            if let Ok(ref locations) = result {
                cache.insert(key.clone(), locations.clone()).await;
            }
            in_flight.lock().await.remove(&key);

            result
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(SearchError::TaskFailed {
                    reason: e.to_string(),
                })
            })
        }
        .boxed()
        .shared()
    }
}
