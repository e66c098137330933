//! Shared cancellation and accounting for one pipeline run.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};

#[derive(Debug, Default)]
pub struct SharedRunState {
    stop: AtomicBool,
    pub nodes_expanded: AtomicU64,
    pub children_written: AtomicU64,
    pub edges_written: AtomicU64,
    pub batches_flushed: AtomicU64,
    active_workers: AtomicUsize,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub nodes_expanded: u64,
    pub children_written: u64,
    pub edges_written: u64,
    pub batches_flushed: u64,
}

impl SharedRunState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[inline]
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn add_expanded(&self, n: u64) {
        self.nodes_expanded.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_flush(&self, children: u64, edges: u64) {
        self.children_written.fetch_add(children, Ordering::Relaxed);
        self.edges_written.fetch_add(edges, Ordering::Relaxed);
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn worker_started(&self) {
        self.active_workers.fetch_add(1, Ordering::AcqRel);
    }

    #[inline]
    pub(crate) fn worker_exited(&self) {
        self.active_workers.fetch_sub(1, Ordering::AcqRel);
    }

    #[inline]
    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::Acquire)
    }

    pub fn counters(&self) -> RunCounters {
        RunCounters {
            nodes_expanded: self.nodes_expanded.load(Ordering::Relaxed),
            children_written: self.children_written.load(Ordering::Relaxed),
            edges_written: self.edges_written.load(Ordering::Relaxed),
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
        }
    }

    /// Clear the stop flag and counters so the state can back another run.
    pub fn reset_accounting(&self) {
        self.stop.store(false, Ordering::Relaxed);
        self.nodes_expanded.store(0, Ordering::Relaxed);
        self.children_written.store(0, Ordering::Relaxed);
        self.edges_written.store(0, Ordering::Relaxed);
        self.batches_flushed.store(0, Ordering::Relaxed);
    }
}
