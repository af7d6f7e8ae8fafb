//! gradecache - In-process cache manager for the grade tracker
//!
//! Thread-safe store with TTL expiration, LRU eviction, hit/miss statistics,
//! a background sweeper and a startup warmup pass.

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod roster;
pub mod tasks;

pub use cache::{CacheKind, CacheStatistics, CacheStore, ContentEntry};
pub use config::Config;
pub use context::{AppCache, CacheContext};
pub use error::{CacheError, Result};
pub use tasks::{spawn_sweeper, warm_up, WarmupReport};
