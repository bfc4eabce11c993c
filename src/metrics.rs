//! Engine counters.
//! One `EngineMetrics` lives inside each engine; the CLI prints a snapshot after a run.
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct EngineMetrics {
    entries_accepted: AtomicU64,
    entries_rejected: AtomicU64,
    entries_duplicate: AtomicU64,
    sessions_opened: AtomicU64,
    sessions_augmented: AtomicU64,
    listings_injected: AtomicU64,
    conditions_failed: AtomicU64,
    stacks_reverted: AtomicU64,
    reopen_violations: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_build(&self, accepted: usize, rejected: usize, duplicate: usize) {
        self.entries_accepted
            .fetch_add(accepted as u64, Ordering::Relaxed);
        self.entries_rejected
            .fetch_add(rejected as u64, Ordering::Relaxed);
        self.entries_duplicate
            .fetch_add(duplicate as u64, Ordering::Relaxed);
    }

    pub fn inc_sessions_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_augmented(&self, injected: usize) {
        self.sessions_augmented.fetch_add(1, Ordering::Relaxed);
        self.listings_injected
            .fetch_add(injected as u64, Ordering::Relaxed);
    }

    pub fn add_conditions_failed(&self, count: usize) {
        self.conditions_failed
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn add_stacks_reverted(&self, count: usize) {
        self.stacks_reverted
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn inc_reopen_violations(&self) {
        self.reopen_violations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            entries_accepted: self.entries_accepted.load(Ordering::Relaxed),
            entries_rejected: self.entries_rejected.load(Ordering::Relaxed),
            entries_duplicate: self.entries_duplicate.load(Ordering::Relaxed),
            sessions_opened: self.sessions_opened.load(Ordering::Relaxed),
            sessions_augmented: self.sessions_augmented.load(Ordering::Relaxed),
            listings_injected: self.listings_injected.load(Ordering::Relaxed),
            conditions_failed: self.conditions_failed.load(Ordering::Relaxed),
            stacks_reverted: self.stacks_reverted.load(Ordering::Relaxed),
            reopen_violations: self.reopen_violations.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Snapshot {
    pub entries_accepted: u64,
    pub entries_rejected: u64,
    pub entries_duplicate: u64,
    pub sessions_opened: u64,
    pub sessions_augmented: u64,
    pub listings_injected: u64,
    pub conditions_failed: u64,
    pub stacks_reverted: u64,
    pub reopen_violations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_into_snapshot() {
        let metrics = EngineMetrics::new();
        assert_eq!(metrics.snapshot(), Snapshot::default());

        metrics.record_build(3, 1, 2);
        metrics.inc_sessions_opened();
        metrics.inc_sessions_opened();
        metrics.record_augmented(4);
        metrics.add_stacks_reverted(2);
        metrics.inc_reopen_violations();

        let snap = metrics.snapshot();
        assert_eq!(snap.entries_accepted, 3);
        assert_eq!(snap.entries_rejected, 1);
        assert_eq!(snap.entries_duplicate, 2);
        assert_eq!(snap.sessions_opened, 2);
        assert_eq!(snap.sessions_augmented, 1);
        assert_eq!(snap.listings_injected, 4);
        assert_eq!(snap.stacks_reverted, 2);
        assert_eq!(snap.reopen_violations, 1);
    }
}
