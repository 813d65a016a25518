//! Persistence provider interface

use crate::error::AccessError;
use crate::types::Grant;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::error;

/// External persistence collaborator behind a `DataSynchronizer`
///
/// The backend (database, file, remote API) and its serialized shape are
/// up to the implementation. Timeouts belong here too: the synchronizer
/// waits for every call to finish.
#[async_trait]
pub trait GrantProvider: Send + Sync {
    /// Fetch the full grant collection
    async fn on_read(&self) -> anyhow::Result<Vec<Grant>>;

    /// Persist the full grant collection
    async fn on_update(&self, grants: &[Grant]) -> anyhow::Result<()>;

    /// Failure notification, fire and forget
    fn on_error(&self, error: &AccessError) {
        error!("Grant provider error: {}", error);
    }
}

/// In-memory provider, mostly useful for tests and embedding
pub struct MemoryProvider {
    grants: Arc<RwLock<Vec<Grant>>>,
}

impl MemoryProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::with_grants(Vec::new())
    }

    /// Create a provider seeded with grants
    pub fn with_grants(grants: Vec<Grant>) -> Self {
        Self {
            grants: Arc::new(RwLock::new(grants)),
        }
    }

    /// Current persisted value
    pub async fn snapshot(&self) -> Vec<Grant> {
        self.grants.read().await.clone()
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GrantProvider for MemoryProvider {
    async fn on_read(&self) -> anyhow::Result<Vec<Grant>> {
        Ok(self.grants.read().await.clone())
    }

    async fn on_update(&self, grants: &[Grant]) -> anyhow::Result<()> {
        let mut stored = self.grants.write().await;
        *stored = grants.to_vec();
        Ok(())
    }
}
