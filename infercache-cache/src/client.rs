//! Caching decorator over a query executor.

use crate::config::CacheConfig;
use crate::key::CacheKey;
use crate::store::{CacheStore, DiskCache};
use async_trait::async_trait;
use infercache_core::{
    ensure_model, response, CacheError, Payload, QueryExecutor, QueryResult, ResponseBody,
};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Snapshot of cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Queries answered from the store.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Queries sent to the executor without a lookup.
    pub bypasses: u64,
    /// Entries written.
    pub stores: u64,
    /// Results not written because they were empty or carried an error.
    pub skipped: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    bypasses: AtomicU64,
    stores: AtomicU64,
    skipped: AtomicU64,
}

impl AtomicStats {
    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            bypasses: self.bypasses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// Serves repeated identical queries from a local store.
///
/// A hit returns the stored body without touching the executor. A miss
/// delegates to the executor and stores the result only when it is
/// non-empty and has no top-level `error` key. Executor failures
/// propagate unchanged and leave nothing behind.
///
/// # Example
///
/// ```ignore
/// use infercache_cache::{CacheConfig, CachingClient};
///
/// let client = CachingClient::new(executor, &CacheConfig::default())?;
/// let first = client.query("openrouter/auto", &payload).await?;   // network
/// let second = client.query("openrouter/auto", &payload).await?;  // disk
/// assert_eq!(first, second);
/// ```
pub struct CachingClient<E, S = DiskCache> {
    executor: E,
    store: S,
    enabled: bool,
    stats: AtomicStats,
}

impl<E: QueryExecutor> CachingClient<E, DiskCache> {
    /// Wrap `executor` with a disk cache at `config.directory`.
    pub fn new(executor: E, config: &CacheConfig) -> QueryResult<Self> {
        let store = DiskCache::new(&config.directory)?;
        Ok(Self::with_store(executor, store).enabled(config.enabled))
    }
}

impl<E: QueryExecutor, S: CacheStore> CachingClient<E, S> {
    /// Wrap `executor` with an arbitrary store.
    pub fn with_store(executor: E, store: S) -> Self {
        Self {
            executor,
            store,
            enabled: true,
            stats: AtomicStats::default(),
        }
    }

    /// Enable or disable caching.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Get a reference to the wrapped executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Query with the cache consulted first.
    pub async fn query(&self, model: &str, payload: &Payload) -> QueryResult<ResponseBody> {
        self.query_with(model, payload, true).await
    }

    /// Query, consulting the cache only when `use_cache` is true.
    ///
    /// Successful results are stored either way, so a bypass call
    /// refreshes the entry.
    pub async fn query_with(
        &self,
        model: &str,
        payload: &Payload,
        use_cache: bool,
    ) -> QueryResult<ResponseBody> {
        ensure_model(model)?;
        let key = CacheKey::derive(model, payload);

        if use_cache && self.enabled {
            match self.store.get(&key).await {
                Ok(Some(body)) => {
                    bump(&self.stats.hits);
                    info!(%key, store = self.store.name(), "Cache hit");
                    return Ok(body);
                }
                Ok(None) => {
                    bump(&self.stats.misses);
                    info!(%key, "Cache miss, calling executor");
                }
                Err(CacheError::Serialization(e)) => {
                    bump(&self.stats.misses);
                    warn!(%key, error = %e, "Unreadable cache entry, treating as miss");
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            bump(&self.stats.bypasses);
            debug!(%key, "Cache bypassed");
        }

        let body = self.executor.execute(model, payload).await?;

        if !self.enabled {
            return Ok(body);
        }

        if response::is_cacheable(&body) {
            self.store.put(&key, &body).await?;
            bump(&self.stats.stores);
            info!(%key, "Stored response in cache");
        } else {
            bump(&self.stats.skipped);
            debug!(%key, "Response empty or error-bearing, not caching");
        }

        Ok(body)
    }
}

#[async_trait]
impl<E: QueryExecutor, S: CacheStore> QueryExecutor for CachingClient<E, S> {
    async fn execute(&self, model: &str, payload: &Payload) -> QueryResult<ResponseBody> {
        self.query(model, payload).await
    }
}
