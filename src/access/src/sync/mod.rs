//! Data synchronization with an external persistence provider
//!
//! The `DataSynchronizer` sits between the in-memory grant set and a
//! `GrantProvider`:
//!
//! - **Single-flight reads**: concurrent `read()` calls share one
//!   `on_read` call; the provider never sees two outstanding reads
//! - **Cached copy**: once a read succeeds, `read()` answers from memory
//!   until `refresh()` forces a new provider read
//! - **Optimistic updates**: `update()` exposes the new value immediately
//!   and rolls back to the previous one if the provider rejects it
//!
//! Updates are neither coalesced nor serialized. With concurrent updates
//! the last `on_update` to complete decides the final value, except that an
//! update still waiting on the provider keeps its optimistic value visible
//! over any older one. A failed update restores the last value the provider
//! confirmed. A read that overlaps an update hands its result to its
//! callers but does not replace the cache.
//!
//! # Example
//!
//! ```rust
//! use cretoai_access::sync::{DataSynchronizer, MemoryProvider};
//! use std::sync::Arc;
//!
//! # async fn example() -> cretoai_access::Result<()> {
//! let sync = DataSynchronizer::new(Arc::new(MemoryProvider::new()));
//!
//! let grants = sync.read().await?;
//! assert!(grants.is_empty());
//! # Ok(())
//! # }
//! ```

mod provider;
mod stats;

pub use provider::{GrantProvider, MemoryProvider};
pub use stats::SyncStats;

use crate::error::{AccessError, Result};
use crate::types::Grant;
use parking_lot::Mutex;
use stats::SyncCounters;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Grant collection shared between the synchronizer and its readers
pub type SharedGrants = Arc<Vec<Grant>>;

type Waiter = oneshot::Sender<Result<SharedGrants>>;

#[derive(Default)]
struct SyncState {
    /// Last successfully read (or optimistically updated) grants
    cached: Option<SharedGrants>,

    /// Last grants the provider confirmed, by a read or an update
    confirmed: Option<SharedGrants>,

    /// `Some` while a provider read is outstanding, holding queued callers
    in_flight: Option<Vec<Waiter>>,

    /// Bumped whenever an update starts or settles
    version: u64,

    /// Versions of updates still waiting on the provider
    pending_updates: BTreeSet<u64>,
}

impl SyncState {
    /// Whether an update started after `seq` is still outstanding
    fn superseded(&self, seq: u64) -> bool {
        self.pending_updates.range(seq + 1..).next().is_some()
    }

    /// Retire update `seq`; returns whether a later update is outstanding
    fn settle(&mut self, seq: u64) -> bool {
        self.pending_updates.remove(&seq);
        self.version += 1;
        self.superseded(seq)
    }
}

enum ReadPlan {
    Cached(SharedGrants),
    Join(oneshot::Receiver<Result<SharedGrants>>),
    /// Start a provider read, remembering the state version it started at
    Fetch(u64),
}

/// Clears the in-flight marker if a fetch is dropped before completing,
/// so queued callers fail instead of waiting forever.
struct InFlight<'a> {
    state: &'a Mutex<SyncState>,
    completed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.completed {
            warn!("Provider read abandoned before completion");
            self.state.lock().in_flight = None;
        }
    }
}

/// Retires an update whose future is dropped before the provider answers.
/// Its optimistic value is withdrawn unless a later update replaced it.
struct PendingUpdate<'a> {
    state: &'a Mutex<SyncState>,
    seq: u64,
    settled: bool,
}

impl Drop for PendingUpdate<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Update abandoned before the provider answered");
            let mut state = self.state.lock();
            if !state.settle(self.seq) {
                state.cached = state.confirmed.clone();
            }
        }
    }
}

/// Bridge between the in-memory grant set and a `GrantProvider`
pub struct DataSynchronizer {
    provider: Arc<dyn GrantProvider>,
    state: Mutex<SyncState>,
    counters: SyncCounters,
}

impl DataSynchronizer {
    /// Create a synchronizer with an empty cache
    pub fn new(provider: Arc<dyn GrantProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(SyncState::default()),
            counters: SyncCounters::default(),
        }
    }

    /// Read the grant collection
    ///
    /// Returns the cached copy when there is one. Otherwise joins the
    /// in-flight provider read, or starts one.
    ///
    /// # Errors
    ///
    /// `AccessError::PersistenceRead` when the provider read fails. Every
    /// caller queued on that read receives the same error.
    pub async fn read(&self) -> Result<SharedGrants> {
        let plan = {
            let mut state = self.state.lock();
            if let Some(waiters) = state.in_flight.as_mut() {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                ReadPlan::Join(rx)
            } else if let Some(cached) = &state.cached {
                ReadPlan::Cached(cached.clone())
            } else {
                state.in_flight = Some(Vec::new());
                ReadPlan::Fetch(state.version)
            }
        };

        self.execute(plan).await
    }

    /// Force a provider read regardless of the cached copy
    ///
    /// A refresh issued while a read is outstanding joins that read.
    pub async fn refresh(&self) -> Result<SharedGrants> {
        let plan = {
            let mut state = self.state.lock();
            if let Some(waiters) = state.in_flight.as_mut() {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                ReadPlan::Join(rx)
            } else {
                state.in_flight = Some(Vec::new());
                ReadPlan::Fetch(state.version)
            }
        };

        self.execute(plan).await
    }

    /// Optimistically replace the grant collection and persist it
    ///
    /// The new value is visible to `read()` and `cached()` while the
    /// provider call is outstanding.
    ///
    /// # Errors
    ///
    /// `AccessError::PersistenceWrite` when the provider rejects the update;
    /// the last confirmed value is restored before the error is returned,
    /// unless a later update has replaced this one in the meantime.
    pub async fn update(&self, grants: Vec<Grant>) -> Result<()> {
        let next: SharedGrants = Arc::new(grants);
        let mut pending = {
            let mut state = self.state.lock();
            state.version += 1;
            let seq = state.version;
            state.pending_updates.insert(seq);
            state.cached = Some(next.clone());
            PendingUpdate {
                state: &self.state,
                seq,
                settled: false,
            }
        };

        let outcome = self.provider.on_update(&next).await;

        {
            let mut state = self.state.lock();
            let superseded = state.settle(pending.seq);
            match &outcome {
                Ok(()) => {
                    state.confirmed = Some(next.clone());
                    if !superseded {
                        state.cached = Some(next.clone());
                    }
                }
                Err(_) => {
                    if !superseded {
                        state.cached = state.confirmed.clone();
                    }
                }
            }
        }
        pending.settled = true;

        match outcome {
            Ok(()) => {
                SyncCounters::incr(&self.counters.updates);
                info!("Persisted {} grants", next.len());
                Ok(())
            }
            Err(err) => {
                SyncCounters::incr(&self.counters.rollbacks);

                let error = AccessError::PersistenceWrite(format!("{:#}", err));
                warn!("Update rejected, rolled back to previous grants: {}", error);
                self.report(&error);
                Err(error)
            }
        }
    }

    /// Cached copy, without touching the provider
    pub fn cached(&self) -> Option<SharedGrants> {
        self.state.lock().cached.clone()
    }

    /// Whether a provider read is outstanding
    pub fn is_reading(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    /// Activity counters
    pub fn stats(&self) -> SyncStats {
        self.counters.snapshot()
    }

    async fn execute(&self, plan: ReadPlan) -> Result<SharedGrants> {
        match plan {
            ReadPlan::Cached(grants) => {
                SyncCounters::incr(&self.counters.cache_hits);
                Ok(grants)
            }
            ReadPlan::Join(rx) => {
                SyncCounters::incr(&self.counters.coalesced_reads);
                debug!("Joining in-flight provider read");
                rx.await.map_err(|_| {
                    AccessError::PersistenceRead("in-flight read was abandoned".to_string())
                })?
            }
            ReadPlan::Fetch(version) => self.fetch(version).await,
        }
    }

    async fn fetch(&self, started_at: u64) -> Result<SharedGrants> {
        let mut guard = InFlight {
            state: &self.state,
            completed: false,
        };

        SyncCounters::incr(&self.counters.provider_reads);
        let outcome = match self.provider.on_read().await {
            Ok(grants) => Ok(Arc::new(grants)),
            Err(err) => Err(AccessError::PersistenceRead(format!("{:#}", err))),
        };

        let waiters = {
            let mut state = self.state.lock();
            if let Ok(grants) = &outcome {
                // An update that started or settled during the read is newer
                if state.version == started_at && state.pending_updates.is_empty() {
                    state.cached = Some(grants.clone());
                    state.confirmed = Some(grants.clone());
                } else {
                    debug!("Update overlapped provider read, keeping cached grants");
                }
            }
            state.in_flight.take().unwrap_or_default()
        };
        guard.completed = true;

        match &outcome {
            Ok(grants) => debug!(
                "Provider read {} grants, releasing {} waiters",
                grants.len(),
                waiters.len()
            ),
            Err(error) => {
                warn!("Provider read failed, failing {} waiters: {}", waiters.len(), error);
                self.report(error);
            }
        }

        for waiter in waiters {
            // Receiver may have been dropped by a cancelled caller
            let _ = waiter.send(outcome.clone());
        }

        outcome
    }

    fn report(&self, error: &AccessError) {
        SyncCounters::incr(&self.counters.errors);
        self.provider.on_error(error);
    }
}
