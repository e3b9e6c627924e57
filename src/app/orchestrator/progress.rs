//! Progress tracking for a single inventory run
//!
//! `ProgressCounter` is the one value shared mutably between download tasks.
//! Observers receive callbacks so the CLI can render progress without the
//! orchestrator knowing anything about terminals.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Atomic counters shared by all tasks of one run
#[derive(Debug, Default)]
pub struct ProgressCounter {
    completed: AtomicUsize,
    failed: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ProgressCounter {
    /// Create a zeroed counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a download as started; returns the new in-flight count
    pub fn start(&self) -> usize {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        now
    }

    /// Mark a download as finished, successfully or not
    pub fn finish(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// Record a successful file; returns the new completed count
    pub fn record_success(&self) -> usize {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Record a file that exhausted its retries
    pub fn record_failure(&self) -> usize {
        self.failed.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Files downloaded so far
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Files that failed so far
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Downloads currently running
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of downloads observed running at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

/// Receives progress events from the orchestrator
pub trait ProgressObserver: Send + Sync {
    /// A run with `total` parts is about to start downloading
    fn on_start(&self, identifier: &str, total: usize);

    /// One file was written; `completed` is the running total
    fn on_file_completed(&self, name: &str, completed: usize);

    /// One file exhausted its retries
    fn on_file_failed(&self, _name: &str) {}

    /// All tasks have been joined
    fn on_finish(&self);
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_start(&self, _identifier: &str, _total: usize) {}

    fn on_file_completed(&self, _name: &str, _completed: usize) {}

    fn on_finish(&self) {}
}
