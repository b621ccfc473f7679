use moka::future::Cache as MokaCache;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::Result;

/// Configuration for response caching
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of items to store
    pub max_capacity: u64,
    /// Time-to-live for cached items
    pub time_to_live: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1000,
            time_to_live: Duration::from_secs(10 * 60),
        }
    }
}

// ---------------------------------------------------------------------------
// Memory backend
// ---------------------------------------------------------------------------

/// In-memory cache backed by Moka
#[derive(Clone)]
pub struct MemoryCache<K, V> {
    cache: MokaCache<K, V>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: &CacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.time_to_live)
            .build();
        Self { cache }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: K, value: V) {
        self.cache.insert(key, value).await;
    }

    pub async fn clear(&self) {
        self.cache.invalidate_all();
        info!("Cache cleared");
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}

// ---------------------------------------------------------------------------
// Read-through layer
// ---------------------------------------------------------------------------

/// Identity of a compound lookup: the operation name plus its parameters
///
/// # Example
///
/// ```
/// use pubmed_network::CacheKey;
///
/// let key = CacheKey::new("citations")
///     .param("pmid", "29622564")
///     .param("limit", 20);
/// assert_eq!(key.to_string(), "citations?pmid=29622564&limit=20");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: &'static str,
    params: Vec<(&'static str, String)>,
}

impl CacheKey {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            params: Vec::new(),
        }
    }

    pub fn param<V: fmt::Display>(mut self, name: &'static str, value: V) -> Self {
        self.params.push((name, value.to_string()));
        self
    }

    pub fn operation(&self) -> &str {
        self.operation
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{name}={value}")?;
        }
        Ok(())
    }
}

/// Values that can veto their own caching
///
/// Degraded results (partial graphs, placeholder payloads) report `false` so
/// the next identical request goes back upstream.
pub trait Cacheable {
    fn should_cache(&self) -> bool {
        true
    }
}

impl<T> Cacheable for Vec<T> {}

/// Memoizes compound lookups, storing only successful complete results
///
/// Concurrent misses for the same key both compute; the shared rate limiter
/// bounds the duplicated upstream load.
#[derive(Clone)]
pub struct ReadThroughCache<V> {
    cache: MemoryCache<CacheKey, V>,
}

impl<V> ReadThroughCache<V>
where
    V: Cacheable + Clone + Send + Sync + 'static,
{
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            cache: MemoryCache::new(config),
        }
    }

    /// Return the cached value for `key`, or run `compute` and cache its success
    ///
    /// An `Err` from `compute` is returned to the caller and leaves no entry.
    pub async fn get_or_compute<F, Fut>(&self, key: CacheKey, compute: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.cache.get(&key).await {
            debug!(key = %key, "Cache hit");
            return Ok(value);
        }
        debug!(key = %key, "Cache miss");

        let value = compute().await?;

        if value.should_cache() {
            self.cache.insert(key.clone(), value.clone()).await;
            debug!(key = %key, "Result cached");
        } else {
            debug!(key = %key, "Incomplete result, not cached");
        }

        Ok(value)
    }

    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        self.cache.get(key).await
    }

    pub async fn clear(&self) {
        self.cache.clear().await;
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    pub async fn sync(&self) {
        self.cache.sync().await;
    }
}
