//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, latency and evictions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Advisory per-entry memory estimate in bytes.
pub const ESTIMATED_ENTRY_BYTES: u64 = 1024;

// == Stats Aggregator ==
/// Lock-free running counters.
///
/// Counters are independent; a reader may observe a hit counted before its
/// latency is added.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    hits: AtomicU64,
    misses: AtomicU64,
    hit_nanos: AtomicU64,
    miss_nanos: AtomicU64,
    evictions: AtomicU64,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hit that took `elapsed`.
    pub fn record_hit(&self, elapsed: Duration) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.hit_nanos
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Records a miss that took `elapsed`.
    pub fn record_miss(&self, elapsed: Duration) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.miss_nanos
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    // == Snapshot ==
    /// Computes derived statistics for a cache currently holding `entry_count` entries.
    pub fn snapshot(&self, entry_count: usize) -> CacheStatistics {
        let hits = self.hits();
        let misses = self.misses();
        let total = hits + misses;

        let (hit_rate, miss_rate) = if total == 0 {
            (0.0, 0.0)
        } else {
            let hit_rate = hits as f64 / total as f64 * 100.0;
            (hit_rate, 100.0 - hit_rate)
        };

        CacheStatistics {
            hits,
            misses,
            hit_rate,
            miss_rate,
            avg_hit_time_ms: average_ms(self.hit_nanos.load(Ordering::Relaxed), hits),
            avg_miss_time_ms: average_ms(self.miss_nanos.load(Ordering::Relaxed), misses),
            entry_count,
            memory_usage_bytes: entry_count as u64 * ESTIMATED_ENTRY_BYTES,
            evictions: self.evictions(),
        }
    }
}

fn average_ms(total_nanos: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total_nanos as f64 / count as f64 / 1_000_000.0
    }
}

// == Cache Statistics ==
/// Point-in-time view of cache performance, computed fresh on each request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    /// Percentage of lookups that hit, 0-100
    pub hit_rate: f64,
    /// Percentage of lookups that missed, 0-100
    pub miss_rate: f64,
    pub avg_hit_time_ms: f64,
    pub avg_miss_time_ms: f64,
    pub entry_count: usize,
    /// Advisory estimate, not a measurement
    pub memory_usage_bytes: u64,
    pub evictions: u64,
}

impl CacheStatistics {
    /// Total number of lookups.
    pub fn requests(&self) -> u64 {
        self.hits + self.misses
    }
}
