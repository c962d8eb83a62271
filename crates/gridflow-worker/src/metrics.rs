//! Atomic pool metrics, observable via a point-in-time snapshot (spec §4.6).

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// A consistent-enough point-in-time read of [`PoolMetrics`].
///
/// Fields are read independently under `Ordering::Relaxed`, so the
/// snapshot is not a single atomic transaction — acceptable for the
/// observability use case this serves (spec §4.6 "observable via a
/// snapshot accessor").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolMetricsSnapshot {
    pub total_workers: u64,
    pub active_workers: u64,
    pub idle_workers: u64,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub tasks_retried: u64,
    pub tasks_dead_lettered: u64,
    pub tasks_queued: u64,
}

/// Atomic counters backing a worker pool's [`PoolMetricsSnapshot`].
#[derive(Debug, Default)]
pub struct PoolMetrics {
    total_workers: AtomicI64,
    active_workers: AtomicI64,
    tasks_completed: AtomicU64,
    tasks_failed: AtomicU64,
    tasks_retried: AtomicU64,
    tasks_dead_lettered: AtomicU64,
}

impl PoolMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn worker_spawned(&self) {
        self.total_workers.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn worker_stopped(&self) {
        self.total_workers.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn worker_became_active(&self) {
        self.active_workers.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn worker_became_idle(&self) {
        self.active_workers.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn task_completed(&self) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn task_failed(&self) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn task_retried(&self) {
        self.tasks_retried.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn task_dead_lettered(&self) {
        self.tasks_dead_lettered.fetch_add(1, Ordering::Relaxed);
    }

    /// A consistent-enough snapshot of every counter, plus the queue's
    /// current ready length supplied by the caller.
    #[must_use]
    pub fn snapshot(&self, tasks_queued: u64) -> PoolMetricsSnapshot {
        let total_workers = self.total_workers.load(Ordering::Relaxed).max(0) as u64;
        let active_workers = self.active_workers.load(Ordering::Relaxed).max(0) as u64;
        PoolMetricsSnapshot {
            total_workers,
            active_workers,
            idle_workers: total_workers.saturating_sub(active_workers),
            tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
            tasks_retried: self.tasks_retried.load(Ordering::Relaxed),
            tasks_dead_lettered: self.tasks_dead_lettered.load(Ordering::Relaxed),
            tasks_queued,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_workers_derives_from_total_minus_active() {
        let metrics = PoolMetrics::new();
        metrics.worker_spawned();
        metrics.worker_spawned();
        metrics.worker_became_active();

        let snap = metrics.snapshot(0);
        assert_eq!(snap.total_workers, 2);
        assert_eq!(snap.active_workers, 1);
        assert_eq!(snap.idle_workers, 1);
    }

    #[test]
    fn counters_accumulate() {
        let metrics = PoolMetrics::new();
        metrics.task_completed();
        metrics.task_completed();
        metrics.task_failed();
        metrics.task_retried();
        metrics.task_dead_lettered();

        let snap = metrics.snapshot(3);
        assert_eq!(snap.tasks_completed, 2);
        assert_eq!(snap.tasks_failed, 1);
        assert_eq!(snap.tasks_retried, 1);
        assert_eq!(snap.tasks_dead_lettered, 1);
        assert_eq!(snap.tasks_queued, 3);
    }

    #[test]
    fn worker_stopped_decrements_total() {
        let metrics = PoolMetrics::new();
        metrics.worker_spawned();
        metrics.worker_spawned();
        metrics.worker_stopped();
        assert_eq!(metrics.snapshot(0).total_workers, 1);
    }
}
