//! Periodic Throughput Reporter
//!
//! Samples an externally owned, monotonically increasing message counter once
//! per interval and hands the observed rate to a report sink.
//!
//! ## Lifecycle
//!
//! 1. Build with [`RateReporter::builder`] (counter, shutdown flag and report
//!    sink are required)
//! 2. Start with [`RateReporter::spawn`] (own tokio task) or await
//!    [`RateReporter::run`] directly
//! 3. Each tick: read counter, compute rate over the interval, report
//!    `(name, rate, shutdown_flag)`
//! 4. The tick that observes the shutdown flag reports with `shutdown = true`
//!    and the loop exits
//!
//! Shutdown is polled, so the final report lands at most one interval after
//! the flag is set.

use crate::error::{Result, ThrottleError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Report sink: `(name, rate_per_second, is_shutting_down)`
pub type ReportFn = Arc<dyn Fn(&str, f64, bool) + Send + Sync>;

/// Source of a shared message counter that only ever increases
pub trait RateCounter: Send + Sync {
    fn rate_counter(&self) -> u64;
}

impl RateCounter for AtomicU64 {
    fn rate_counter(&self) -> u64 {
        self.load(Ordering::Acquire)
    }
}

impl<T: RateCounter + ?Sized> RateCounter for Arc<T> {
    fn rate_counter(&self) -> u64 {
        (**self).rate_counter()
    }
}

/// Background throughput sampler
pub struct RateReporter {
    name: String,
    counter: Arc<dyn RateCounter>,
    shutdown: Arc<AtomicBool>,
    report: ReportFn,
    interval_ms: u64,
}

impl RateReporter {
    pub fn builder() -> RateReporterBuilder {
        RateReporterBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Messages per second over `elapsed_ms`, linearly extrapolated.
    ///
    /// A zero-length interval has no meaningful rate and yields `0.0`.
    pub fn calculate_rate_per_second(elapsed_ms: u64, delta_count: u64) -> f64 {
        if elapsed_ms == 0 {
            return 0.0;
        }
        delta_count as f64 * 1000.0 / elapsed_ms as f64
    }

    /// Run the reporter on its own tokio task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Sampling loop; returns after the report that carries `shutdown = true`
    pub async fn run(self) {
        // tokio intervals reject a zero period
        let period = Duration::from_millis(self.interval_ms.max(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last_count = self.counter.rate_counter();

        info!(
            reporter = %self.name,
            interval_ms = self.interval_ms,
            "Rate reporter started"
        );

        loop {
            ticker.tick().await;

            let current = self.counter.rate_counter();
            let delta = current.saturating_sub(last_count);
            let rate = Self::calculate_rate_per_second(self.interval_ms, delta);
            last_count = current;

            let shutting_down = self.shutdown.load(Ordering::Acquire);
            debug!(
                reporter = %self.name,
                delta = delta,
                rate = rate,
                shutting_down = shutting_down,
                "Rate sampled"
            );

            (self.report)(&self.name, rate, shutting_down);

            if shutting_down {
                break;
            }
        }

        info!(reporter = %self.name, total = last_count, "Rate reporter stopped");
    }
}

/// Builder for [`RateReporter`].
///
/// `counter`, `shutdown_signal` and `report_fn` are required; `build()` fails
/// with [`ThrottleError::InvalidArgument`] when any of them is missing.
#[derive(Default)]
pub struct RateReporterBuilder {
    name: String,
    counter: Option<Arc<dyn RateCounter>>,
    shutdown: Option<Arc<AtomicBool>>,
    report: Option<ReportFn>,
    interval_ms: u64,
}

impl RateReporterBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn counter<C: RateCounter + 'static>(mut self, counter: C) -> Self {
        self.counter = Some(Arc::new(counter));
        self
    }

    pub fn shutdown_signal(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn report_fn<F>(mut self, report: F) -> Self
    where
        F: Fn(&str, f64, bool) + Send + Sync + 'static,
    {
        self.report = Some(Arc::new(report));
        self
    }

    pub fn interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    pub fn build(self) -> Result<RateReporter> {
        let counter = self.counter.ok_or_else(|| {
            ThrottleError::InvalidArgument("rate counter source is required".to_string())
        })?;
        let shutdown = self.shutdown.ok_or_else(|| {
            ThrottleError::InvalidArgument("shutdown signal is required".to_string())
        })?;
        let report = self.report.ok_or_else(|| {
            ThrottleError::InvalidArgument("report function is required".to_string())
        })?;

        Ok(RateReporter {
            name: self.name,
            counter,
            shutdown,
            report,
            interval_ms: self.interval_ms,
        })
    }
}
