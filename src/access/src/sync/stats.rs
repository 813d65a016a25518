//! Synchronizer counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of synchronizer activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Calls made to the provider's `on_read`
    pub provider_reads: u64,

    /// Reads that joined an in-flight provider read
    pub coalesced_reads: u64,

    /// Reads answered from the cached copy
    pub cache_hits: u64,

    /// Updates confirmed by the provider
    pub updates: u64,

    /// Updates rolled back after a provider failure
    pub rollbacks: u64,

    /// Failures routed to the provider's error sink
    pub errors: u64,
}

impl SyncStats {
    /// Share of `read()` calls served without a provider call of their own
    pub fn hit_rate(&self) -> f64 {
        let served = self.cache_hits + self.coalesced_reads;
        let total = served + self.provider_reads;
        if total == 0 {
            0.0
        } else {
            served as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SyncCounters {
    pub provider_reads: AtomicU64,
    pub coalesced_reads: AtomicU64,
    pub cache_hits: AtomicU64,
    pub updates: AtomicU64,
    pub rollbacks: AtomicU64,
    pub errors: AtomicU64,
}

impl SyncCounters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SyncStats {
        SyncStats {
            provider_reads: self.provider_reads.load(Ordering::Relaxed),
            coalesced_reads: self.coalesced_reads.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            rollbacks: self.rollbacks.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}
