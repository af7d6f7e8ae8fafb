//! Cache Entry Module
//!
//! Defines individual cache entries with TTL and access metadata.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Kind ==
/// Category tag used for bulk invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheKind {
    Student,
    GradeReport,
    Statistics,
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CacheKind::Student => "STUDENT",
            CacheKind::GradeReport => "GRADE_REPORT",
            CacheKind::Statistics => "STATISTICS",
        };
        f.write_str(name)
    }
}

// == Cache Entry ==
/// A single cached value with its metadata.
///
/// Access metadata lives in atomics so a hit only needs a shared reference
/// to the entry.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored value, shared with whoever inserted it
    pub value: Arc<V>,
    pub kind: CacheKind,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Time-to-live in milliseconds, 0 = never expires
    pub ttl_ms: u64,
    last_accessed: AtomicU64,
    access_count: AtomicU64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry created at `now`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `kind` - Category of the value
    /// * `ttl` - Optional TTL, `None` or zero never expires
    /// * `now` - Creation timestamp in Unix milliseconds
    pub fn new(value: Arc<V>, kind: CacheKind, ttl: Option<Duration>, now: u64) -> Self {
        Self {
            value,
            kind,
            created_at: now,
            ttl_ms: ttl_to_ms(ttl),
            last_accessed: AtomicU64::new(now),
            access_count: AtomicU64::new(0),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry expires once strictly more than `ttl_ms` has elapsed since
    /// creation. Entries without a TTL never expire.
    pub fn is_expired(&self, now: u64) -> bool {
        self.ttl_ms > 0 && now.saturating_sub(self.created_at) > self.ttl_ms
    }

    // == Record Access ==
    /// Marks a successful read at `now`.
    pub fn record_access(&self, now: u64) {
        // never move behind creation, even if the clock steps backwards
        self.last_accessed
            .fetch_max(now.max(self.created_at), Ordering::Relaxed);
        self.access_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn last_accessed(&self) -> u64 {
        self.last_accessed.load(Ordering::Relaxed)
    }

    pub fn access_count(&self) -> u64 {
        self.access_count.load(Ordering::Relaxed)
    }

    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self, now: u64) -> Option<u64> {
        (self.ttl_ms > 0).then(|| {
            let expires = self.created_at.saturating_add(self.ttl_ms);
            expires.saturating_sub(now)
        })
    }

    // == Describe ==
    /// Builds the listing row for this entry as seen at `now`.
    pub fn describe(&self, key: &str, now: u64) -> ContentEntry {
        ContentEntry {
            key: key.to_string(),
            kind: self.kind,
            created_at: to_datetime(self.created_at),
            last_accessed: to_datetime(self.last_accessed()),
            access_count: self.access_count(),
            ttl_ms: self.ttl_ms,
            ttl_remaining_ms: self.ttl_remaining_ms(now),
            is_expired: self.is_expired(now),
        }
    }
}

// == Content Entry ==
/// Metadata row returned by the contents listing. Values are not included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentEntry {
    pub key: String,
    pub kind: CacheKind,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
    /// 0 = never expires
    pub ttl_ms: u64,
    /// None when the entry never expires
    pub ttl_remaining_ms: Option<u64>,
    pub is_expired: bool,
}

/// Millisecond TTL stored on an entry, 0 = never expires.
///
/// Any positive duration maps to at least 1 ms and saturates at `u64::MAX`.
fn ttl_to_ms(ttl: Option<Duration>) -> u64 {
    match ttl {
        Some(ttl) if !ttl.is_zero() => u64::try_from(ttl.as_millis())
            .unwrap_or(u64::MAX)
            .max(1),
        _ => 0,
    }
}

fn to_datetime(ms: u64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms as i64).unwrap_or_default()
}
