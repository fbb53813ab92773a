// Session metrics
//
// Lightweight counters for what the operator did during one console session

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Per-session operation counters.
///
/// Uses atomic operations so services can share one instance without locks.
/// The summary is logged when the console exits.
#[derive(Debug)]
pub struct Metrics {
    /// Process records shown by list operations
    pub processes_listed: AtomicU64,

    /// Keyword filters executed
    pub filters_run: AtomicU64,

    /// Termination requests opened
    pub kills_attempted: AtomicU64,

    /// Termination requests that ended in a successful kill
    pub kills_succeeded: AtomicU64,

    pub locks_acquired: AtomicU64,

    pub locks_released: AtomicU64,

    /// Successful set/unset read-only operations
    pub protection_changes: AtomicU64,

    /// Operations that ended with an error shown to the operator
    pub failures: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            processes_listed: AtomicU64::new(0),
            filters_run: AtomicU64::new(0),
            kills_attempted: AtomicU64::new(0),
            kills_succeeded: AtomicU64::new(0),
            locks_acquired: AtomicU64::new(0),
            locks_released: AtomicU64::new(0),
            protection_changes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a list operation that showed `count` processes
    pub fn record_processes_listed(&self, count: usize) {
        self.processes_listed
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_filter(&self) {
        self.filters_run.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_kill_attempt(&self) {
        self.kills_attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_kill_success(&self) {
        self.kills_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lock(&self) {
        self.locks_acquired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unlock(&self) {
        self.locks_released.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_protection_change(&self) {
        self.protection_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get session duration
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// One-line summary of the session
    pub fn summary(&self) -> String {
        format!(
            "{} processes listed, {} filters, kills {}/{} succeeded, {} locks, {} unlocks, {} protection changes, {} failures in {:.0}s",
            self.processes_listed.load(Ordering::Relaxed),
            self.filters_run.load(Ordering::Relaxed),
            self.kills_succeeded.load(Ordering::Relaxed),
            self.kills_attempted.load(Ordering::Relaxed),
            self.locks_acquired.load(Ordering::Relaxed),
            self.locks_released.load(Ordering::Relaxed),
            self.protection_changes.load(Ordering::Relaxed),
            self.failures.load(Ordering::Relaxed),
            self.uptime().as_secs_f64()
        )
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Session Summary ===");
        tracing::info!("{}", self.summary());
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
