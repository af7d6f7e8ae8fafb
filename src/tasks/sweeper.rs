//! TTL Sweeper Task
//!
//! Background task that periodically removes expired cache entries.
//! Reads already expire entries lazily; the sweeper reclaims the ones that
//! are never read again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{self, JoinHandle};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::cache::CacheStore;

// == Sweeper Handle ==
/// Owner of a running sweeper. Dropping it also stops the task.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stops the sweeper.
    ///
    /// A sweep already in progress is given `grace` to finish. After that the
    /// task is aborted and this returns; the sweep itself runs on the
    /// blocking pool and is left to complete there.
    pub async fn shutdown(self, grace: Duration) {
        let _ = self.shutdown.send(true);
        let abort = self.handle.abort_handle();

        match tokio::time::timeout(grace, self.handle).await {
            Ok(Ok(())) => info!("Sweeper stopped"),
            Ok(Err(e)) => warn!(error = %e, "Sweeper task ended abnormally"),
            Err(_) => {
                abort.abort();
                warn!(
                    grace_ms = grace.as_millis() as u64,
                    "Sweeper did not stop within grace period, aborted"
                );
            }
        }
    }
}

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The first sweep happens one full `interval` after spawning. Each sweep
/// runs on the blocking pool; a panic inside one is logged and the next tick
/// runs as usual.
///
/// # Arguments
/// * `cache` - Shared cache to sweep
/// * `interval` - Time between sweeps
///
/// # Example
/// ```ignore
/// let cache = Arc::new(CacheStore::<String>::new(150, None));
/// let sweeper = spawn_sweeper(cache.clone(), Duration::from_secs(300));
/// // Later, during shutdown:
/// sweeper.shutdown(Duration::from_secs(5)).await;
/// ```
pub fn spawn_sweeper<V>(cache: Arc<CacheStore<V>>, interval: Duration) -> SweeperHandle
where
    V: Send + Sync + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs_f64(),
            "Starting TTL sweeper task"
        );

        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // also fires if the handle was dropped
                _ = shutdown_rx.changed() => {
                    debug!("TTL sweeper received shutdown signal");
                    break;
                }
                _ = ticker.tick() => run_sweep(cache.clone()).await,
            }
        }
    });

    SweeperHandle {
        shutdown: shutdown_tx,
        handle,
    }
}

async fn run_sweep<V>(cache: Arc<CacheStore<V>>)
where
    V: Send + Sync + 'static,
{
    match task::spawn_blocking(move || cache.sweep_expired()).await {
        Ok(0) => debug!("TTL sweep: no expired entries found"),
        Ok(removed) => info!(removed, "TTL sweep: removed expired entries"),
        Err(e) if e.is_panic() => {
            let panic = e.into_panic();
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(%reason, "TTL sweep failed, retrying next tick");
        }
        Err(e) => warn!(error = %e, "TTL sweep cancelled"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    use crate::cache::{CacheKind, Clock, ManualClock};

    const TICK: Duration = Duration::from_millis(20);

    fn store(clock: Arc<dyn Clock>) -> Arc<CacheStore<String>> {
        Arc::new(CacheStore::with_clock(100, None, clock))
    }

    fn put_ttl(cache: &CacheStore<String>, key: &str, ttl: Duration) {
        cache
            .put_with_ttl(key, "value".to_string(), CacheKind::Student, Some(ttl))
            .unwrap();
    }

    #[derive(Debug, Default)]
    struct FlakyClock {
        now: AtomicU64,
        failing: AtomicBool,
    }

    impl Clock for FlakyClock {
        fn now_ms(&self) -> u64 {
            if self.failing.load(Ordering::SeqCst) {
                panic!("clock unavailable");
            }
            self.now.load(Ordering::SeqCst)
        }
    }

    /// Clock whose reads block the calling thread while `stalled` is set.
    #[derive(Debug)]
    struct StallingClock {
        now: AtomicU64,
        stalled: AtomicBool,
        stall: Duration,
    }

    impl Clock for StallingClock {
        fn now_ms(&self) -> u64 {
            if self.stalled.load(Ordering::SeqCst) {
                std::thread::sleep(self.stall);
            }
            self.now.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_sweeper_removes_expired_entries() {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = store(clock.clone());

        put_ttl(&cache, "expire_soon", Duration::from_secs(1));
        clock.advance(Duration::from_secs(2));

        let sweeper = spawn_sweeper(cache.clone(), TICK);
        tokio::time::sleep(TICK * 5).await;

        assert!(cache.is_empty(), "Expired entry should have been swept");
        assert!(cache.recency_order().is_empty());
        // sweeping must not count as lookups
        assert_eq!(cache.statistics().requests(), 0);

        sweeper.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_sweeper_preserves_valid_entries() {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = store(clock.clone());

        put_ttl(&cache, "long_lived", Duration::from_secs(3600));
        cache
            .put_with_ttl("forever", "value".to_string(), CacheKind::Statistics, None)
            .unwrap();
        clock.advance(Duration::from_secs(60));

        let sweeper = spawn_sweeper(cache.clone(), TICK);
        tokio::time::sleep(TICK * 5).await;

        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.get("long_lived").unwrap().as_deref(),
            Some(&"value".to_string())
        );

        sweeper.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_sweeper_survives_panicking_sweep() {
        let clock = Arc::new(FlakyClock::default());
        let cache = store(clock.clone());

        put_ttl(&cache, "key", Duration::from_millis(100));
        clock.failing.store(true, Ordering::SeqCst);

        let sweeper = spawn_sweeper(cache.clone(), TICK);
        tokio::time::sleep(TICK * 5).await;
        assert!(!sweeper.handle.is_finished(), "Sweeper must outlive a failed sweep");

        clock.now.store(10_000, Ordering::SeqCst);
        clock.failing.store(false, Ordering::SeqCst);
        tokio::time::sleep(TICK * 5).await;

        assert!(cache.is_empty(), "Sweeper should recover on the next tick");
        sweeper.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_sweeper_shutdown_stops_task() {
        let cache = store(Arc::new(ManualClock::new(0)));

        let sweeper = spawn_sweeper(cache, Duration::from_secs(3600));
        let abort = sweeper.handle.abort_handle();

        sweeper.shutdown(Duration::from_secs(1)).await;
        assert!(abort.is_finished(), "Task should be finished after shutdown");
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_task() {
        let cache = store(Arc::new(ManualClock::new(0)));

        let sweeper = spawn_sweeper(cache, Duration::from_secs(3600));
        let abort = sweeper.handle.abort_handle();
        drop(sweeper);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(abort.is_finished());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_aborts_stalled_sweep_after_grace() {
        let clock = Arc::new(StallingClock {
            now: AtomicU64::new(1_000),
            stalled: AtomicBool::new(false),
            stall: Duration::from_secs(1),
        });
        let cache = store(clock.clone());
        put_ttl(&cache, "key", Duration::from_secs(60));
        clock.stalled.store(true, Ordering::SeqCst);

        let sweeper = spawn_sweeper(cache.clone(), TICK);
        let abort = sweeper.handle.abort_handle();
        // let the first sweep start and block inside the clock
        tokio::time::sleep(TICK * 3).await;

        let started = std::time::Instant::now();
        sweeper.shutdown(Duration::from_millis(100)).await;
        let elapsed = started.elapsed();

        assert!(
            elapsed < Duration::from_millis(600),
            "shutdown took {:?}, grace was not enforced",
            elapsed
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(abort.is_finished(), "Stalled sweeper should have been aborted");
        clock.stalled.store(false, Ordering::SeqCst);
    }
}
