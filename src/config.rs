//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Default maximum number of cached entries
pub const DEFAULT_MAX_ENTRIES: usize = 150;

/// Default time-to-live for entries stored without an explicit TTL (30 minutes)
pub const DEFAULT_TTL_SECS: u64 = 30 * 60;

/// Default interval between background sweeps (5 minutes)
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5 * 60;

/// Default time shutdown waits for the sweeper before aborting it
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL in seconds applied by `put` (0 = never expires)
    pub default_ttl: u64,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// Seconds shutdown waits for an in-flight sweep
    pub shutdown_grace: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 150)
    /// - `CACHE_DEFAULT_TTL_SECS` - Default TTL in seconds (default: 1800)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Sweep frequency in seconds (default: 300)
    /// - `CACHE_SHUTDOWN_GRACE_SECS` - Sweeper shutdown grace period (default: 5)
    pub fn from_env() -> Self {
        Self {
            max_entries: env_or("CACHE_MAX_ENTRIES", DEFAULT_MAX_ENTRIES),
            default_ttl: env_or("CACHE_DEFAULT_TTL_SECS", DEFAULT_TTL_SECS),
            sweep_interval: env_or("CACHE_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS),
            shutdown_grace: env_or("CACHE_SHUTDOWN_GRACE_SECS", DEFAULT_SHUTDOWN_GRACE_SECS),
        }
    }

    /// Default TTL as a duration, `None` when entries never expire.
    pub fn default_ttl(&self) -> Option<Duration> {
        (self.default_ttl > 0).then(|| Duration::from_secs(self.default_ttl))
    }

    pub fn sweep_interval(&self) -> Duration {
        // A zero interval would make tokio's interval panic
        Duration::from_secs(self.sweep_interval.max(1))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl: DEFAULT_TTL_SECS,
            sweep_interval: DEFAULT_SWEEP_INTERVAL_SECS,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE_SECS,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
