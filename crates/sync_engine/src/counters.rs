//! Per-manager sync counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one Sync Manager
#[derive(Debug, Default)]
pub struct SyncCounters {
    /// Size samples accepted
    updates: AtomicU64,
    /// Resize bursts detected (rising edges of `is_resizing`)
    bursts: AtomicU64,
    /// Backend requests issued
    requests: AtomicU64,
    /// Backend requests that failed or timed out
    failures: AtomicU64,
    /// Sync attempts that issued no request
    skipped: AtomicU64,
    /// Responses discarded because the session was reset meanwhile
    stale: AtomicU64,
}

impl SyncCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_updates(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bursts(&self) -> u64 {
        self.bursts.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_bursts(&self) {
        self.bursts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stale(&self) -> u64 {
        self.stale.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_stale(&self) {
        self.stale.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            updates: self.updates(),
            bursts: self.bursts(),
            requests: self.requests(),
            failures: self.failures(),
            skipped: self.skipped(),
            stale: self.stale(),
        }
    }
}

/// Point-in-time copy of [`SyncCounters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub updates: u64,
    pub bursts: u64,
    pub requests: u64,
    pub failures: u64,
    pub skipped: u64,
    pub stale: u64,
}
