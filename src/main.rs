//! gradecache - composition root
//!
//! Builds the cache context, warms it from the roster, logs cache activity
//! and tears everything down on shutdown.

use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gradecache::models::{grade_report_key, student_key, CachedValue, StudentSource};
use gradecache::roster::InMemoryRoster;
use gradecache::{AppCache, CacheContext, Config};

/// Interval between statistics log lines.
const STATS_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache context (store + sweeper)
/// 4. Warm the cache from the roster
/// 5. Serve lookups until SIGINT/SIGTERM
/// 6. Shut the cache down
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gradecache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting grade tracker cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, default_ttl={}s, sweep_interval={}s",
        config.max_entries, config.default_ttl, config.sweep_interval
    );

    let ctx = CacheContext::init(&config).context("failed to initialize cache")?;

    let roster = InMemoryRoster::sample();
    let report = ctx.warm_up(&roster, &roster);
    info!("Warmup report: {}", serde_json::to_string(&report)?);

    serve_lookups(ctx.cache(), &roster)?;

    let stats_cache = ctx.cache().clone();
    let stats_logger = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(STATS_LOG_INTERVAL);
        loop {
            ticker.tick().await;
            log_statistics(&stats_cache);
        }
    });

    shutdown_signal().await;

    stats_logger.abort();
    log_statistics(ctx.cache());
    match serde_json::to_string_pretty(&ctx.cache().contents()) {
        Ok(contents) => info!("Final cache contents:\n{}", contents),
        Err(e) => warn!(error = %e, "Could not render cache contents"),
    }

    ctx.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

/// Reads every student and grade report through the cache, filling misses
/// from the roster.
fn serve_lookups(cache: &AppCache, roster: &InMemoryRoster) -> anyhow::Result<()> {
    for student in roster.all_students()? {
        if cache.get(&student_key(&student.id))?.is_none() {
            cache.put_value(student_key(&student.id), CachedValue::Student(student.clone()))?;
        }

        let key = grade_report_key(&student.id);
        if cache.get(&key)?.is_none() {
            let report = roster.grade_report(&student.id)?;
            cache.put_value(key, CachedValue::GradeReport(report))?;
        }
    }
    Ok(())
}

fn log_statistics(cache: &AppCache) {
    match serde_json::to_string(&cache.statistics()) {
        Ok(stats) => info!("Cache statistics: {}", stats),
        Err(e) => warn!(error = %e, "Could not render cache statistics"),
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
