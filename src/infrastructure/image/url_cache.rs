//! Persistent TTL cache of resolved image URLs.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, info, trace, warn};

use crate::domain::entities::CacheEntry;
use crate::domain::ports::{CacheStorePort, Clock, SystemClock};

use super::file_store::MemoryStore;

/// Default time-to-live of a cached URL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default maximum number of cached URLs.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Key under which the cache is persisted.
pub const STORAGE_KEY: &str = "trybe_image_url_cache_v1";

/// Configuration for the URL cache.
#[derive(Debug, Clone)]
pub struct UrlCacheConfig {
    /// Entry lifetime.
    pub ttl: Duration,
    /// Maximum entries kept in memory.
    pub max_entries: usize,
    /// Key used with the persistent store.
    pub storage_key: String,
}

impl Default for UrlCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
            storage_key: STORAGE_KEY.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Keys in insertion order, oldest first.
    order: VecDeque<String>,
}

impl CacheState {
    fn insert(&mut self, entry: CacheEntry) {
        if self.entries.contains_key(&entry.key) {
            self.order.retain(|k| *k != entry.key);
        }
        self.order.push_back(entry.key.clone());
        self.entries.insert(entry.key.clone(), entry);
    }

    fn remove(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
            true
        } else {
            false
        }
    }

    fn retain(&mut self, mut keep: impl FnMut(&CacheEntry) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| keep(entry));
        let entries = &self.entries;
        self.order.retain(|k| entries.contains_key(k));
        before - self.entries.len()
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let key = self.order.pop_front()?;
        self.entries.remove(&key);
        Some(key)
    }

    fn snapshot(&self) -> Vec<CacheEntry> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).cloned())
            .collect()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

/// Bounded reference → URL cache with TTL expiry.
///
/// Reads are served from memory. Every mutation is written through to the
/// persistent store while the write lock is held, so the store always sees
/// mutations in order. Store failures switch the cache to memory-only for
/// the rest of the session.
pub struct UrlCache {
    state: RwLock<CacheState>,
    store: Arc<dyn CacheStorePort>,
    clock: Arc<dyn Clock>,
    config: UrlCacheConfig,
    persistent: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for UrlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlCache")
            .field("config", &self.config)
            .field("persistent", &self.is_persistent())
            .finish_non_exhaustive()
    }
}

impl UrlCache {
    /// Creates an empty cache without touching the store.
    #[must_use]
    pub fn new(
        store: Arc<dyn CacheStorePort>,
        clock: Arc<dyn Clock>,
        config: UrlCacheConfig,
    ) -> Self {
        let config = UrlCacheConfig {
            max_entries: config.max_entries.max(1),
            ..config
        };
        Self {
            state: RwLock::new(CacheState::default()),
            store,
            clock,
            config,
            persistent: AtomicBool::new(true),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a cache populated from the store, dropping expired entries.
    ///
    /// A store that cannot be read leaves the cache empty and memory-only.
    pub async fn load(
        store: Arc<dyn CacheStorePort>,
        clock: Arc<dyn Clock>,
        config: UrlCacheConfig,
    ) -> Self {
        let cache = Self::new(store, clock, config);

        match cache.store.read_all(&cache.config.storage_key).await {
            Ok(stored) => {
                let mut state = cache.state.write().await;
                for entry in stored {
                    if CacheEntry::is_cacheable_key(&entry.key) && !entry.resolved_url.is_empty() {
                        state.insert(entry);
                    }
                }
                while state.entries.len() > cache.config.max_entries {
                    state.evict_oldest();
                }
                info!(entries = state.entries.len(), "Loaded image URL cache");
            }
            Err(e) => {
                warn!(error = %e, "Image URL cache store unreadable, running memory-only");
                cache.persistent.store(false, Ordering::Relaxed);
            }
        }

        cache.sweep_expired().await;
        cache
    }

    /// Creates a memory-only cache on the system clock.
    #[must_use]
    pub fn in_memory(config: UrlCacheConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(SystemClock), config)
    }

    /// Returns the cached URL for `key` if it has not expired.
    ///
    /// Expired entries are left in place; `sweep_expired` removes them.
    pub async fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now_millis();
        let state = self.state.read().await;
        match state.entries.get(key) {
            Some(entry) if entry.is_fresh(now, self.config.ttl) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, "URL cache hit");
                Some(entry.resolved_url.clone())
            }
            Some(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, "URL cache entry expired");
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, "URL cache miss");
                None
            }
        }
    }

    /// Stores `url` under `key`, evicting the oldest entry when full.
    ///
    /// Returns false when the key is not cacheable (`data:`/`blob:`) or the
    /// URL is empty.
    pub async fn put(&self, key: &str, url: &str) -> bool {
        if !CacheEntry::is_cacheable_key(key) || url.is_empty() {
            trace!(key = %key, "Refusing to cache");
            return false;
        }

        let entry = CacheEntry::new(key, url, self.clock.now_millis());
        let mut state = self.state.write().await;
        state.insert(entry);
        while state.entries.len() > self.config.max_entries {
            if let Some(evicted) = state.evict_oldest() {
                debug!(key = %evicted, "Evicted oldest URL cache entry");
            }
        }
        debug!(key = %key, "Stored resolved URL");
        self.flush(&state).await;
        true
    }

    /// Removes the given keys. Returns how many entries were removed.
    pub async fn invalidate<I, S>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.state.write().await;
        let removed = keys
            .into_iter()
            .filter(|key| state.remove(key.as_ref()))
            .count();
        if removed > 0 {
            debug!(removed, "Invalidated URL cache entries");
            self.flush(&state).await;
        }
        removed
    }

    /// Removes every entry whose key contains `needle`.
    pub async fn invalidate_by_prefix(&self, needle: &str) -> usize {
        let mut state = self.state.write().await;
        let removed = state.retain(|entry| !entry.key.contains(needle));
        if removed > 0 {
            debug!(needle = %needle, removed, "Invalidated URL cache entries by prefix");
            self.flush(&state).await;
        }
        removed
    }

    /// Drops all expired entries and persists the survivors.
    pub async fn sweep_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let ttl = self.config.ttl;
        let mut state = self.state.write().await;
        let removed = state.retain(|entry| entry.is_fresh(now, ttl));
        if removed > 0 {
            debug!(removed, "Swept expired URL cache entries");
        }
        self.flush(&state).await;
        removed
    }

    /// Empties the cache and the persistent store.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.clear();
        if self.is_persistent()
            && let Err(e) = self.store.remove_all(&self.config.storage_key).await
        {
            self.disable_persistence(&e);
        }
        debug!("Cleared image URL cache");
    }

    /// Returns the entries in insertion order, oldest first.
    pub async fn entries(&self) -> Vec<CacheEntry> {
        self.state.read().await.snapshot()
    }

    /// Returns the number of entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns false once the store has failed this session.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.persistent.load(Ordering::Relaxed)
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &UrlCacheConfig {
        &self.config
    }

    /// Returns cache statistics.
    #[allow(clippy::cast_precision_loss)]
    pub async fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len().await,
            persistent: self.is_persistent(),
        }
    }

    async fn flush(&self, state: &RwLockWriteGuard<'_, CacheState>) {
        if !self.is_persistent() {
            return;
        }
        let snapshot = state.snapshot();
        if let Err(e) = self
            .store
            .write_all(&self.config.storage_key, &snapshot)
            .await
        {
            self.disable_persistence(&e);
        } else {
            trace!(entries = snapshot.len(), "Persisted URL cache");
        }
    }

    fn disable_persistence(&self, error: &dyn std::fmt::Display) {
        warn!(error = %error, "Image URL cache store failed, continuing memory-only");
        self.persistent.store(false, Ordering::Relaxed);
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of misses, expired entries included.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of entries.
    pub size: usize,
    /// Whether mutations still reach the persistent store.
    pub persistent: bool,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} urls, {:.1}% hit rate ({} hits, {} misses){}",
            self.size,
            self.hit_rate,
            self.hits,
            self.misses,
            if self.persistent { "" } else { " [memory-only]" }
        )
    }
}
