//! Throttled producer demo
//!
//! Simulates a producer capped by a [`RateLimiter`] while a [`RateReporter`]
//! logs the throughput it achieves.
//!
//! Usage:
//!   STREAMFORGE_RATE_LIMIT=200 cargo run --example throttled_producer

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use streamforge_throttle::{log_sink, RateLimiter, RateReporter, ThrottleConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ThrottleConfig::from_env();
    config.validate()?;
    info!(
        name = %config.name,
        limit = config.limit_per_second,
        interval_ms = config.report_interval_ms,
        "Starting throttled producer"
    );

    let limiter = RateLimiter::from_config(&config);
    let sent = Arc::new(AtomicU64::new(0));
    let shutdown = Arc::new(AtomicBool::new(false));

    let reporter = RateReporter::builder()
        .name(config.name.clone())
        .counter(sent.clone())
        .shutdown_signal(shutdown.clone())
        .report_fn(log_sink())
        .interval_ms(config.report_interval_ms)
        .build()?
        .spawn();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        limiter.acquire().await;
        // Stand-in for producer.send(...)
        sent.fetch_add(1, Ordering::AcqRel);
    }

    shutdown.store(true, Ordering::Release);
    reporter.await?;

    info!(total = sent.load(Ordering::Acquire), "Done");
    Ok(())
}
