//! Fixed-Window Rate Limiter for Producers
//!
//! Bounds how many messages a producer sends per one-second window.
//!
//! ## Algorithm
//!
//! One window starts at `start_time`. Every produced message bumps
//! `message_count`. Before producing, the caller asks [`RateLimiter::check`]:
//!
//! - **Under budget** (`message_count <= limit`): idle for zero
//! - **Over budget, window elapsed**: window restarts at `now`, count drops to
//!   zero, idle for zero
//! - **Over budget, window open**: idle for the rest of the window
//!
//! The window resets fully rather than decaying, so this is not a sliding
//! window. `check` only touches `message_count` on rollover, so repeated
//! checks without increments are idempotent.
//!
//! ## Concurrency
//!
//! - Increments are a single atomic add (no lost updates across producers)
//! - The read-then-reset in `check` runs under the `start_time` mutex, so two
//!   callers cannot both roll the same window over

use crate::config::ThrottleConfig;
use crate::metrics;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Length of one accounting window
pub const WINDOW: Duration = Duration::from_secs(1);

/// Fixed one-second window message counter
#[derive(Debug)]
pub struct RateLimiter {
    limit_per_second: u64,
    message_count: AtomicU64,
    start_time: Mutex<Instant>,
}

impl RateLimiter {
    /// Create a limiter whose first window starts now
    pub fn new(limit_per_second: u64) -> Self {
        Self::with_start(limit_per_second, Instant::now())
    }

    /// Create a limiter whose first window starts at `start`
    pub fn with_start(limit_per_second: u64, start: Instant) -> Self {
        Self {
            limit_per_second,
            message_count: AtomicU64::new(0),
            start_time: Mutex::new(start),
        }
    }

    pub fn from_config(config: &ThrottleConfig) -> Self {
        Self::new(config.limit_per_second)
    }

    /// Record one produced message
    pub fn increment_message_count(&self) {
        self.message_count.fetch_add(1, Ordering::AcqRel);
    }

    /// How long the caller must idle before producing again.
    ///
    /// Returns zero when under budget or when the window has elapsed (the
    /// window then restarts at `now`). Otherwise returns the time left in the
    /// current window.
    pub fn check(&self, now: Instant) -> Duration {
        let mut start = self.lock_start();
        let elapsed = now.saturating_duration_since(*start);
        let count = self.message_count.load(Ordering::Acquire);

        if count <= self.limit_per_second {
            return Duration::ZERO;
        }

        if elapsed >= WINDOW {
            self.roll_over(&mut start, now, count);
            debug!(
                messages = count,
                limit = self.limit_per_second,
                elapsed_ms = elapsed.as_millis() as u64,
                "Rate limit window rolled over"
            );
            return Duration::ZERO;
        }

        let idle = WINDOW - elapsed;
        metrics::THROTTLE_WAITS_TOTAL.inc();
        trace!(
            messages = count,
            limit = self.limit_per_second,
            idle_ms = idle.as_millis() as u64,
            "Over rate limit"
        );
        idle
    }

    /// Check against the current time and sleep if over budget.
    ///
    /// Returns how long the caller was held back.
    pub async fn throttle(&self) -> Duration {
        let idle = self.check(Instant::now());
        if !idle.is_zero() {
            tokio::time::sleep(idle).await;
        }
        idle
    }

    /// Throttle, then count one message.
    pub async fn acquire(&self) -> Duration {
        let idle = self.throttle().await;
        self.increment_message_count();
        idle
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::Acquire)
    }

    pub fn start_time(&self) -> Instant {
        *self.lock_start()
    }

    pub fn limit_per_second(&self) -> u64 {
        self.limit_per_second
    }

    /// Restart the window at `now`, discounting the `counted` messages seen
    /// by the caller. Increments that landed after that read carry over.
    fn roll_over(&self, start: &mut Instant, now: Instant, counted: u64) {
        *start = now;
        self.message_count.fetch_sub(counted, Ordering::AcqRel);
    }

    fn lock_start(&self) -> MutexGuard<'_, Instant> {
        // A panic while holding the guard cannot leave the Instant half-written.
        self.start_time
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const TEST_LIMIT: u64 = 3;

    /// Limiter that has just gone one message over its budget
    fn over_limit(start: Instant) -> RateLimiter {
        let limiter = RateLimiter::with_start(TEST_LIMIT, start);
        for _ in 0..=TEST_LIMIT {
            limiter.increment_message_count();
        }
        limiter
    }

    #[test]
    fn test_under_limit_no_idle() {
        let now = Instant::now();
        let limiter = RateLimiter::with_start(TEST_LIMIT, now);
        limiter.increment_message_count();

        assert_eq!(limiter.check(now), Duration::ZERO);
    }

    #[test]
    fn test_at_limit_no_idle() {
        let now = Instant::now();
        let limiter = RateLimiter::with_start(TEST_LIMIT, now);
        for _ in 0..TEST_LIMIT {
            limiter.increment_message_count();
        }

        assert_eq!(limiter.check(now), Duration::ZERO);
        assert_eq!(limiter.check(now + Duration::from_millis(10)), Duration::ZERO);
        assert_eq!(limiter.check(now + Duration::from_secs(5)), Duration::ZERO);
        // Under budget never resets the window
        assert_eq!(limiter.start_time(), now);
        assert_eq!(limiter.message_count(), TEST_LIMIT);
    }

    #[test]
    fn test_over_limit_at_window_start_idles_full_window() {
        let now = Instant::now();
        let limiter = over_limit(now);

        assert_eq!(limiter.check(now), Duration::from_secs(1));
    }

    #[test]
    fn test_over_limit_idles_remaining_window() {
        let now = Instant::now();
        let limiter = over_limit(now);

        let idle = limiter.check(now + (Duration::from_secs(1) - Duration::from_millis(20)));
        assert_eq!(idle, Duration::from_millis(20));
    }

    #[test]
    fn test_over_limit_after_window_resets() {
        let now = Instant::now();
        let limiter = over_limit(now);

        let above_one_second = now + Duration::from_secs(1) + Duration::from_millis(20);
        assert_eq!(limiter.check(above_one_second), Duration::ZERO);
        assert_eq!(limiter.message_count(), 0);
        assert_eq!(limiter.start_time(), above_one_second);
    }

    #[test]
    fn test_over_limit_exactly_one_second_resets() {
        let now = Instant::now();
        let limiter = over_limit(now);

        let boundary = now + Duration::from_secs(1);
        assert_eq!(limiter.check(boundary), Duration::ZERO);
        assert_eq!(limiter.message_count(), 0);
        assert_eq!(limiter.start_time(), boundary);
    }

    #[test]
    fn test_repeated_check_does_not_touch_count() {
        let now = Instant::now();
        let limiter = over_limit(now);

        let mid = now + Duration::from_millis(400);
        assert_eq!(limiter.check(mid), Duration::from_millis(600));
        assert_eq!(limiter.check(mid), Duration::from_millis(600));
        assert_eq!(limiter.message_count(), TEST_LIMIT + 1);
        assert_eq!(limiter.start_time(), now);
    }

    #[test]
    fn test_check_before_start_time_is_clamped() {
        let now = Instant::now() + Duration::from_secs(10);
        let limiter = over_limit(now);

        // An instant earlier than the window start counts as zero elapsed
        assert_eq!(limiter.check(now - Duration::from_secs(5)), WINDOW);
    }

    #[test]
    fn test_concurrent_increments_not_lost() {
        let limiter = Arc::new(RateLimiter::new(u64::MAX));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        limiter.increment_message_count();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(limiter.message_count(), 8000);
    }

    #[test]
    fn test_rollover_keeps_increment_after_count_read() {
        let now = Instant::now();
        let limiter = over_limit(now);

        let counted = limiter.message_count();
        // Lands between the count read and the reset
        limiter.increment_message_count();

        let later = now + Duration::from_secs(2);
        limiter.roll_over(&mut limiter.lock_start(), later, counted);
        assert_eq!(limiter.message_count(), 1);
        assert_eq!(limiter.start_time(), later);
    }

    #[test]
    fn test_increments_racing_rollovers_are_not_lost() {
        let start = Instant::now();
        let limiter = Arc::new(RateLimiter::with_start(0, start));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        limiter.increment_message_count();
                    }
                })
            })
            .collect();

        // Every check is a full window later, so each one rolls over
        let mut discounted = 0;
        for k in 1..=200u32 {
            let mut guard = limiter.lock_start();
            let counted = limiter.message_count.load(Ordering::Acquire);
            limiter.roll_over(&mut guard, start + WINDOW * k, counted);
            discounted += counted;
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(discounted + limiter.message_count(), 4000);
    }

    #[test]
    fn test_from_config() {
        let config = ThrottleConfig {
            limit_per_second: 42,
            ..Default::default()
        };
        let limiter = RateLimiter::from_config(&config);
        assert_eq!(limiter.limit_per_second(), 42);
        assert_eq!(limiter.message_count(), 0);
    }

    #[tokio::test]
    async fn test_acquire_under_limit_does_not_wait() {
        let limiter = RateLimiter::new(100);

        for _ in 0..10 {
            assert_eq!(limiter.acquire().await, Duration::ZERO);
        }
        assert_eq!(limiter.message_count(), 10);
    }

    #[tokio::test]
    async fn test_throttle_sleeps_when_over_limit() {
        let start = Instant::now() - Duration::from_millis(950);
        let limiter = over_limit(start);

        let waited = limiter.throttle().await;
        assert!(waited > Duration::ZERO);
        assert!(waited <= Duration::from_millis(50));
        assert!(start.elapsed() >= WINDOW);
    }
}
