//! Logger metrics for observability
//!
//! Counters for monitoring fan-out health: how many records were dispatched,
//! how many sink writes failed, and how often the fallback channel had to
//! step in.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use multisink_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dispatched();
/// metrics.record_delivered();
///
/// assert_eq!(metrics.records_dispatched(), 1);
/// assert_eq!(metrics.sink_failures(), 0);
/// ```
#[derive(Debug, Default)]
pub struct LoggerMetrics {
    /// Records built and fanned out
    records_dispatched: AtomicU64,

    /// Successful individual sink writes
    writes_delivered: AtomicU64,

    /// Sink writes that returned an error or panicked
    sink_failures: AtomicU64,

    /// Failure reports written through the first sink
    fallback_reports: AtomicU64,

    /// Lines written straight to stderr because the fallback sink failed too
    last_resort_writes: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            records_dispatched: AtomicU64::new(0),
            writes_delivered: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            fallback_reports: AtomicU64::new(0),
            last_resort_writes: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_dispatched(&self) -> u64 {
        self.records_dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn writes_delivered(&self) -> u64 {
        self.writes_delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn fallback_reports(&self) -> u64 {
        self.fallback_reports.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn last_resort_writes(&self) -> u64 {
        self.last_resort_writes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) {
        self.records_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_delivered(&self) {
        self.writes_delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the previous failure count
    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_fallback_report(&self) {
        self.fallback_reports.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_last_resort(&self) {
        self.last_resort_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Percentage of sink writes that failed
    pub fn failure_rate(&self) -> f64 {
        let failed = self.sink_failures();
        let attempted = failed + self.writes_delivered();
        if attempted == 0 {
            return 0.0;
        }
        (failed as f64 / attempted as f64) * 100.0
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.records_dispatched.store(0, Ordering::Relaxed);
        self.writes_delivered.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
        self.fallback_reports.store(0, Ordering::Relaxed);
        self.last_resort_writes.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = LoggerMetrics::new();

        metrics.record_dispatched();
        metrics.record_delivered();
        metrics.record_delivered();
        assert_eq!(metrics.record_sink_failure(), 0);
        metrics.record_fallback_report();
        metrics.record_last_resort();

        assert_eq!(metrics.records_dispatched(), 1);
        assert_eq!(metrics.writes_delivered(), 2);
        assert_eq!(metrics.sink_failures(), 1);
        assert_eq!(metrics.fallback_reports(), 1);
        assert_eq!(metrics.last_resort_writes(), 1);
    }

    #[test]
    fn test_failure_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_delivered();
        }
        for _ in 0..10 {
            metrics.record_sink_failure();
        }

        let rate = metrics.failure_rate();
        assert!((9.9..=10.1).contains(&rate), "Failure rate was {}", rate);
    }

    #[test]
    fn test_reset() {
        let metrics = LoggerMetrics::new();
        metrics.record_dispatched();
        metrics.record_sink_failure();

        metrics.reset();

        assert_eq!(metrics.records_dispatched(), 0);
        assert_eq!(metrics.sink_failures(), 0);
    }
}
