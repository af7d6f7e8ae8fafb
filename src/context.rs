//! Cache Context
//!
//! Owns the application cache and its sweeper for the lifetime of the
//! process. Built once by the composition root and shut down explicitly.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::info;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{CachedValue, StatisticsSource, StudentSource};
use crate::tasks::{spawn_sweeper, warm_up, SweeperHandle, WarmupReport};

/// Cache shared by the application's handlers.
pub type AppCache = CacheStore<CachedValue>;

// == Cache Context ==
#[derive(Debug)]
pub struct CacheContext {
    cache: Arc<AppCache>,
    sweeper: SweeperHandle,
    shutdown_grace: Duration,
}

impl CacheContext {
    /// Creates the cache described by `config` and starts its sweeper.
    ///
    /// Must be called from within a tokio runtime.
    pub fn init(config: &Config) -> Result<Self> {
        Self::with_store(AppCache::from_config(config), config)
    }

    /// Wraps an already built store, e.g. one driven by a manual clock.
    pub fn with_store(store: AppCache, config: &Config) -> Result<Self> {
        Handle::try_current().map_err(|e| {
            CacheError::Internal(format!("cache sweeper needs a tokio runtime: {}", e))
        })?;

        let cache = Arc::new(store);
        let sweeper = spawn_sweeper(cache.clone(), config.sweep_interval());
        info!(
            max_entries = cache.capacity(),
            default_ttl_secs = config.default_ttl,
            sweep_interval_secs = config.sweep_interval,
            "Cache initialized"
        );

        Ok(Self {
            cache,
            sweeper,
            shutdown_grace: config.shutdown_grace(),
        })
    }

    pub fn cache(&self) -> &Arc<AppCache> {
        &self.cache
    }

    /// Runs the startup warmup pass against this context's cache.
    pub fn warm_up(
        &self,
        students: &dyn StudentSource,
        statistics: &dyn StatisticsSource,
    ) -> WarmupReport {
        warm_up(&self.cache, students, statistics)
    }

    /// Stops the sweeper and discards the cache contents.
    pub async fn shutdown(self) {
        let entries = self.cache.len();
        self.sweeper.shutdown(self.shutdown_grace).await;
        self.cache.clear();
        info!(discarded = entries, "Cache shut down");
    }
}
