//! Cache Store Module
//!
//! Main cache engine combining a concurrent map with LRU tracking, TTL
//! expiration and lock-free statistics.
//!
//! # Locking
//! - `entries` is a sharded concurrent map, never locked as a whole.
//! - `lru` has its own read/write lock. Every insertion or removal of a key
//!   happens while holding it, which keeps the tracker and the map in step.
//! - Lock order is always tracker, then map shard. No map guard is held
//!   while the tracker lock is acquired.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::cache::{
    CacheEntry, CacheKind, CacheStatistics, Clock, ContentEntry, LruTracker, StatsAggregator,
    SystemClock, MAX_KEY_LENGTH,
};
use crate::config::Config;
use crate::error::{CacheError, Result};

enum Lookup<V> {
    Hit(Arc<V>),
    Expired,
    Missing,
}

// == Cache Store ==
/// Thread-safe cache with LRU eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: DashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: RwLock<LruTracker>,
    /// Performance statistics
    stats: StatsAggregator,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL applied by `put`
    default_ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the cache can hold (at least 1)
    /// * `default_ttl` - TTL for entries stored through `put`, `None` never expires
    pub fn new(max_entries: usize, default_ttl: Option<Duration>) -> Self {
        Self::with_clock(max_entries, default_ttl, Arc::new(SystemClock))
    }

    /// Creates a CacheStore reading time from `clock`.
    pub fn with_clock(
        max_entries: usize,
        default_ttl: Option<Duration>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let max_entries = max_entries.max(1);

        Self {
            entries: DashMap::with_capacity(max_entries),
            lru: RwLock::new(LruTracker::with_capacity(max_entries)),
            stats: StatsAggregator::new(),
            max_entries,
            default_ttl,
            clock,
        }
    }

    /// Creates a CacheStore from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_entries, config.default_ttl())
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` when the key is absent or expired. Expired entries are
    /// removed and counted as misses.
    pub fn get(&self, key: &str) -> Result<Option<Arc<V>>> {
        validate_key(key)?;
        let started = Instant::now();
        let now = self.clock.now_ms();

        let lookup = match self.entries.get(key) {
            Some(entry) if entry.is_expired(now) => Lookup::Expired,
            Some(entry) => {
                entry.record_access(now);
                Lookup::Hit(Arc::clone(&entry.value))
            }
            None => Lookup::Missing,
        };

        match lookup {
            Lookup::Hit(value) => {
                // a concurrent removal may have won; do not resurrect the key
                self.lru.write().touch_existing(key);
                self.stats.record_hit(started.elapsed());
                Ok(Some(value))
            }
            Lookup::Expired => {
                if self.remove_expired(key, now) {
                    debug!(key, "Removed expired entry on read");
                }
                self.stats.record_miss(started.elapsed());
                Ok(None)
            }
            Lookup::Missing => {
                self.stats.record_miss(started.elapsed());
                Ok(None)
            }
        }
    }

    // == Put ==
    /// Stores a value under `key` with the default TTL.
    pub fn put(
        &self,
        key: impl Into<String>,
        value: impl Into<Arc<V>>,
        kind: CacheKind,
    ) -> Result<()> {
        self.put_with_ttl(key, value, kind, self.default_ttl)
    }

    /// Stores a value under `key` with an explicit TTL.
    ///
    /// An existing entry is replaced outright: timestamps and access count
    /// start over. If the key is new and the cache is at capacity, the least
    /// recently used entry is evicted first.
    ///
    /// # Arguments
    /// * `ttl` - `None` or a zero duration never expires
    pub fn put_with_ttl(
        &self,
        key: impl Into<String>,
        value: impl Into<Arc<V>>,
        kind: CacheKind,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let key = key.into();
        validate_key(&key)?;

        let entry = CacheEntry::new(value.into(), kind, ttl, self.clock.now_ms());

        let mut lru = self.lru.write();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_one(&mut lru);
        }
        self.entries.insert(key.clone(), entry);
        lru.touch(&key);

        Ok(())
    }

    // == Invalidate ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn invalidate(&self, key: &str) -> Result<bool> {
        validate_key(key)?;

        let mut lru = self.lru.write();
        let removed = self.entries.remove(key).is_some();
        lru.remove(key);
        Ok(removed)
    }

    /// Removes every entry of the given kind. Returns the number removed.
    pub fn invalidate_by_type(&self, kind: CacheKind) -> usize {
        let mut lru = self.lru.write();
        let mut removed = Vec::new();

        self.entries.retain(|key, entry| {
            if entry.kind == kind {
                removed.push(key.clone());
                false
            } else {
                true
            }
        });
        for key in &removed {
            lru.remove(key);
        }

        debug!(%kind, count = removed.len(), "Invalidated entries by kind");
        removed.len()
    }

    /// Empties the cache. Statistics counters are kept.
    pub fn clear(&self) {
        let mut lru = self.lru.write();
        self.entries.clear();
        lru.clear();
    }

    // == Sweep Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| entry.key().clone())
            .collect();

        expired
            .iter()
            .filter(|key| self.remove_expired(key, now))
            .count()
    }

    // == Statistics ==
    /// Returns current cache statistics.
    pub fn statistics(&self) -> CacheStatistics {
        self.stats.snapshot(self.entries.len())
    }

    // == Contents ==
    /// Lists entry metadata, most recently accessed first.
    pub fn contents(&self) -> Vec<ContentEntry> {
        let now = self.clock.now_ms();
        let lru = self.lru.read();

        lru.keys_oldest_first()
            .iter()
            .rev()
            .filter_map(|key| self.entries.get(key).map(|entry| entry.describe(key, now)))
            .collect()
    }

    /// Tracked keys from least to most recently used.
    pub fn recency_order(&self) -> Vec<String> {
        self.lru.read().keys_oldest_first()
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    fn evict_one(&self, lru: &mut LruTracker) {
        match lru.evict_oldest() {
            Some(victim) => {
                self.entries.remove(&victim);
                self.stats.record_eviction();
                debug!(key = %victim, "Evicted least recently used entry");
            }
            None => {
                // unreachable while every insert/remove goes through the tracker lock
                warn!(
                    entries = self.entries.len(),
                    "Recency tracker empty while cache is full, skipping eviction"
                );
            }
        }
    }

    /// Removes `key` only if it is still expired at `now`, so a value
    /// re-put concurrently survives.
    fn remove_expired(&self, key: &str, now: u64) -> bool {
        let mut lru = self.lru.write();
        let removed = self
            .entries
            .remove_if(key, |_, entry| entry.is_expired(now))
            .is_some();
        if removed {
            lru.remove(key);
        }
        removed
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key must not be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
