//! StreamForge Throttle
//!
//! Keeps a producer under a configured message rate and reports the
//! throughput it actually achieves.
//!
//! # Components
//!
//! - **RateLimiter**: fixed one-second window counter. Producers call
//!   [`RateLimiter::check`] before sending and idle for the returned duration.
//! - **RateReporter**: background sampler that reads a shared counter every
//!   interval and hands the computed rate to a report sink until shutdown.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
//! use std::sync::Arc;
//! use streamforge_throttle::{log_sink, RateLimiter, RateReporter};
//!
//! let limiter = RateLimiter::new(500);
//! let sent = Arc::new(AtomicU64::new(0));
//! let shutdown = Arc::new(AtomicBool::new(false));
//!
//! let reporter = RateReporter::builder()
//!     .name("orders-producer")
//!     .counter(sent.clone())
//!     .shutdown_signal(shutdown.clone())
//!     .report_fn(log_sink())
//!     .interval_ms(1000)
//!     .build()?
//!     .spawn();
//!
//! loop {
//!     limiter.acquire().await;
//!     producer.send(...).await?;
//!     sent.fetch_add(1, Ordering::Relaxed);
//! }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod rate_limiter;
pub mod reporter;

pub use config::ThrottleConfig;
pub use error::{Result, ThrottleError};
pub use metrics::{log_sink, prometheus_sink};
pub use rate_limiter::RateLimiter;
pub use reporter::{RateCounter, RateReporter, RateReporterBuilder, ReportFn};
