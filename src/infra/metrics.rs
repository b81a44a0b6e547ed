//! Lock-free metrics collection and periodic reporting
//!
//! Uses atomics for hot-path operations to avoid mutex contention.
//! All counter updates are lock-free; reporting is the only operation
//! that needs synchronization (via atomic swap).
//!
//! NOTE: All atomics use Relaxed ordering intentionally. These are
//! statistical counters only; do not use them for coordination or logic
//! decisions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Update an atomic max value using compare-and-swap loop
#[inline]
fn update_atomic_max(atomic_max: &AtomicU64, new_value: u64) {
    let mut current_max = atomic_max.load(Ordering::Relaxed);
    while new_value > current_max {
        match atomic_max.compare_exchange_weak(
            current_max,
            new_value,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => break,
            Err(actual) => current_max = actual,
        }
    }
}

/// Lock-free metrics collector for the walk engine
pub struct Metrics {
    /// Sessions started (monotonic)
    sessions_started_total: AtomicU64,
    /// Fixes accepted into a route (monotonic)
    fixes_accepted_total: AtomicU64,
    /// Fixes rejected by the validator (monotonic)
    fixes_rejected_total: AtomicU64,
    /// Fixes dropped because the engine queue was full (monotonic)
    fixes_dropped_total: AtomicU64,
    /// Fixes accepted since last report (reset on report)
    fixes_since_report: AtomicU64,
    /// Sum of fix processing latencies in microseconds (reset on report)
    fix_latency_sum_us: AtomicU64,
    /// Max fix processing latency in microseconds (reset on report)
    fix_latency_max_us: AtomicU64,
    /// Walks persisted successfully (monotonic)
    walks_saved_total: AtomicU64,
    /// Walk save failures (monotonic)
    walk_save_failures_total: AtomicU64,
    /// Last report time (only accessed from the reporter)
    last_report_time: parking_lot::Mutex<Instant>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            sessions_started_total: AtomicU64::new(0),
            fixes_accepted_total: AtomicU64::new(0),
            fixes_rejected_total: AtomicU64::new(0),
            fixes_dropped_total: AtomicU64::new(0),
            fixes_since_report: AtomicU64::new(0),
            fix_latency_sum_us: AtomicU64::new(0),
            fix_latency_max_us: AtomicU64::new(0),
            walks_saved_total: AtomicU64::new(0),
            walk_save_failures_total: AtomicU64::new(0),
            last_report_time: parking_lot::Mutex::new(Instant::now()),
        }
    }

    /// Record a session start (lock-free)
    #[inline]
    pub fn record_session_started(&self) {
        self.sessions_started_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an accepted fix with its processing latency (lock-free)
    #[inline]
    pub fn record_fix_accepted(&self, latency_us: u64) {
        self.fixes_accepted_total.fetch_add(1, Ordering::Relaxed);
        self.fixes_since_report.fetch_add(1, Ordering::Relaxed);
        self.fix_latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        update_atomic_max(&self.fix_latency_max_us, latency_us);
    }

    /// Record a fix rejected by the validator (lock-free)
    #[inline]
    pub fn record_fix_rejected(&self) {
        self.fixes_rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a fix dropped on a full engine queue (lock-free)
    #[inline]
    pub fn record_fix_dropped(&self) {
        self.fixes_dropped_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a walk persisted successfully (lock-free)
    #[inline]
    pub fn record_walk_saved(&self) {
        self.walks_saved_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a walk save failure (lock-free)
    #[inline]
    pub fn record_walk_save_failure(&self) {
        self.walk_save_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn fixes_accepted_total(&self) -> u64 {
        self.fixes_accepted_total.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn fixes_rejected_total(&self) -> u64 {
        self.fixes_rejected_total.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn walks_saved_total(&self) -> u64 {
        self.walks_saved_total.load(Ordering::Relaxed)
    }

    /// Build a report, swapping the since-report counters to zero
    pub fn report(&self) -> MetricsSummary {
        let mut last_report = self.last_report_time.lock();
        let elapsed_secs = last_report.elapsed().as_secs_f64();
        *last_report = Instant::now();
        drop(last_report);

        let fixes = self.fixes_since_report.swap(0, Ordering::Relaxed);
        let latency_sum = self.fix_latency_sum_us.swap(0, Ordering::Relaxed);
        let latency_max = self.fix_latency_max_us.swap(0, Ordering::Relaxed);

        let fixes_per_sec = if elapsed_secs > 0.0 { fixes as f64 / elapsed_secs } else { 0.0 };
        let avg_latency_us = if fixes > 0 { latency_sum / fixes } else { 0 };

        MetricsSummary {
            elapsed_secs,
            fixes,
            fixes_per_sec,
            avg_fix_latency_us: avg_latency_us,
            max_fix_latency_us: latency_max,
            fixes_accepted_total: self.fixes_accepted_total.load(Ordering::Relaxed),
            fixes_rejected_total: self.fixes_rejected_total.load(Ordering::Relaxed),
            fixes_dropped_total: self.fixes_dropped_total.load(Ordering::Relaxed),
            sessions_started_total: self.sessions_started_total.load(Ordering::Relaxed),
            walks_saved_total: self.walks_saved_total.load(Ordering::Relaxed),
            walk_save_failures_total: self.walk_save_failures_total.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics for one reporting interval
#[derive(Debug)]
pub struct MetricsSummary {
    pub elapsed_secs: f64,
    /// Fixes accepted in the interval
    pub fixes: u64,
    pub fixes_per_sec: f64,
    pub avg_fix_latency_us: u64,
    pub max_fix_latency_us: u64,
    pub fixes_accepted_total: u64,
    pub fixes_rejected_total: u64,
    pub fixes_dropped_total: u64,
    pub sessions_started_total: u64,
    pub walks_saved_total: u64,
    pub walk_save_failures_total: u64,
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            fixes = %self.fixes,
            fixes_per_sec = format_args!("{:.2}", self.fixes_per_sec),
            avg_latency_us = %self.avg_fix_latency_us,
            max_latency_us = %self.max_fix_latency_us,
            accepted_total = %self.fixes_accepted_total,
            rejected_total = %self.fixes_rejected_total,
            dropped_total = %self.fixes_dropped_total,
            sessions_total = %self.sessions_started_total,
            walks_saved = %self.walks_saved_total,
            save_failures = %self.walk_save_failures_total,
            "metrics_report"
        );
    }
}
