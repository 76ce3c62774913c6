//! Throughput Metrics and Report Sinks
//!
//! Prometheus metrics for producer throttling, plus ready-made report sinks
//! for [`RateReporter`](crate::RateReporter).

use lazy_static::lazy_static;
use prometheus::{Encoder, GaugeVec, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Once;
use tracing::info;

static INIT: Once = Once::new();

lazy_static! {
    /// Registry holding the throttle metrics
    pub static ref REGISTRY: Registry = Registry::new();

    /// Most recently reported produce rate, per reporter
    pub static ref PRODUCE_RATE: GaugeVec = GaugeVec::new(
        Opts::new(
            "streamforge_produce_rate_per_second",
            "Observed produce rate in messages per second"
        ),
        &["reporter"]
    ).expect("metric can be created");

    /// Number of times the rate limiter told a producer to idle
    pub static ref THROTTLE_WAITS_TOTAL: IntCounter = IntCounter::new(
        "streamforge_throttle_waits_total",
        "Total rate limiter checks that required the producer to wait"
    ).expect("metric can be created");
}

/// Register the throttle metrics. Idempotent.
pub fn init() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(PRODUCE_RATE.clone()))
            .expect("produce_rate can be registered");
        REGISTRY
            .register(Box::new(THROTTLE_WAITS_TOTAL.clone()))
            .expect("throttle_waits_total can be registered");
    });
}

/// Render the registry in the Prometheus text exposition format
pub fn gather_text() -> prometheus::Result<String> {
    init();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Report sink that logs each sample as a structured `info!` event
pub fn log_sink() -> impl Fn(&str, f64, bool) + Send + Sync + 'static {
    |name: &str, rate: f64, shutting_down: bool| {
        info!(
            reporter = name,
            rate_per_second = rate,
            shutting_down = shutting_down,
            "Produce rate"
        );
    }
}

/// Report sink that publishes each sample to the `PRODUCE_RATE` gauge
pub fn prometheus_sink() -> impl Fn(&str, f64, bool) + Send + Sync + 'static {
    init();
    |name: &str, rate: f64, _shutting_down: bool| {
        PRODUCE_RATE.with_label_values(&[name]).set(rate);
    }
}
