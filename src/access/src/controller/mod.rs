//! Access controllers
//!
//! `AccessControl` owns the grant store and answers role-based queries.
//! `UserAccessControl` adds a role mapper and answers user-based queries.
//!
//! # Flow
//!
//! ```text
//! grant(role) → GrantStore ──→ can(role).check(action, resource) → PermissionResult
//!                  ↑  ↓                                                   ↓
//!        refresh() │  │ commit()                          filter(object, attributes)
//!                  │  ↓
//!            DataSynchronizer ↔ GrantProvider
//! ```

mod builder;
mod permission;
mod user;

pub use builder::GrantBuilder;
pub use permission::Permission;
pub use user::UserAccessControl;

use crate::config::AccessConfig;
use crate::error::{AccessError, Result};
use crate::filter;
use crate::store::{GrantStore, NestedGrants};
use crate::sync::DataSynchronizer;
use crate::types::{Grant, GrantAction, GrantAttribute, PermissionResult, PolicyMetadata};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Role-based access controller
pub struct AccessControl {
    store: GrantStore,
    config: AccessConfig,
    sync: Option<Arc<DataSynchronizer>>,
}

impl AccessControl {
    /// Create a controller with an empty grant store
    pub fn new() -> Self {
        Self::with_config(AccessConfig::default())
    }

    /// Create a controller with custom configuration
    pub fn with_config(config: AccessConfig) -> Self {
        Self {
            store: GrantStore::new(),
            config,
            sync: None,
        }
    }

    /// Create a controller seeded with existing grants
    pub fn from_grants(grants: Vec<Grant>) -> Self {
        Self::from_grants_with_config(grants, AccessConfig::default())
    }

    /// Create a controller seeded with existing grants and custom configuration
    pub fn from_grants_with_config(grants: Vec<Grant>, config: AccessConfig) -> Self {
        Self {
            store: GrantStore::from_grants(grants),
            config,
            sync: None,
        }
    }

    /// Attach a synchronizer and load the grant set from it
    ///
    /// The synchronizer becomes the source of truth: the local grants are
    /// replaced by what it reads.
    pub async fn connect(&mut self, sync: Arc<DataSynchronizer>) -> Result<()> {
        let grants = sync.read().await?;
        self.store.replace(grants.to_vec())?;
        self.sync = Some(sync);

        info!("Connected to grant provider: {} grants loaded", self.store.len());

        if self.config.lock_on_connect {
            self.store.lock();
        }

        Ok(())
    }

    /// Upsert one policy: the single authoring primitive
    ///
    /// Without metadata the configured default (`["*"]` unless overridden)
    /// is used.
    ///
    /// # Errors
    ///
    /// `AccessError::StoreLocked` after `lock()`.
    pub fn authorize(
        &mut self,
        role: &str,
        action: GrantAction,
        resource: &str,
        metadata: Option<PolicyMetadata>,
    ) -> Result<&mut Self> {
        let metadata = metadata.unwrap_or_else(|| self.config.default_metadata.clone());
        self.store.upsert_policy(role, resource, action, metadata)?;
        Ok(self)
    }

    /// Start authoring grants for `role`
    pub fn grant(&mut self, role: impl Into<String>) -> GrantBuilder<'_> {
        GrantBuilder::new(self, role.into())
    }

    /// Query permissions of a single role
    pub fn can(&self, role: &str) -> Permission<'_> {
        Permission::new(self.store.grants(), vec![role.to_string()])
    }

    /// Query permissions of a role-set, earlier roles taking precedence
    pub fn can_any<I, S>(&self, roles: I) -> Permission<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Permission::new(self.store.grants(), roles.into_iter().map(Into::into).collect())
    }

    /// Permission and metadata for (role, resource, action)
    pub fn get_metadata(&self, role: &str, resource: &str, action: GrantAction) -> PermissionResult {
        self.can(role).check(action, resource)
    }

    /// Attribute rules for (role, resource, action); empty when denied
    pub fn attributes(&self, role: &str, resource: &str, action: GrantAction) -> Vec<GrantAttribute> {
        self.get_metadata(role, resource, action).attributes().to_vec()
    }

    /// Redacted view of `object` for (role, resource, action)
    ///
    /// Returns `Ok(None)` when the action is denied.
    pub fn project<T: Serialize + ?Sized>(
        &self,
        role: &str,
        resource: &str,
        action: GrantAction,
        object: &T,
    ) -> Result<Option<Value>> {
        let permission = self.get_metadata(role, resource, action);
        if !permission.granted {
            return Ok(None);
        }

        filter::filter(object, permission.attributes()).map(Some)
    }

    /// Lock the grant store; further authoring fails with `StoreLocked`
    pub fn lock(&mut self) -> &mut Self {
        self.store.lock();
        self
    }

    pub fn is_locked(&self) -> bool {
        self.store.is_locked()
    }

    /// Grants in insertion order
    pub fn grants(&self) -> &[Grant] {
        self.store.grants()
    }

    /// Nested role → resource → action view of the grants
    pub fn dump_grants(&self) -> NestedGrants {
        self.store.nested()
    }

    pub fn store(&self) -> &GrantStore {
        &self.store
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Attached synchronizer, if any
    pub fn synchronizer(&self) -> Option<&Arc<DataSynchronizer>> {
        self.sync.as_ref()
    }

    /// Persist the local grants through the synchronizer
    ///
    /// On a provider failure the synchronizer rolls back, and the local
    /// store follows it to the restored value unless the store is locked.
    pub async fn commit(&mut self) -> Result<()> {
        let sync = self.sync.clone().ok_or(AccessError::NoSynchronizer)?;

        match sync.update(self.store.grants().to_vec()).await {
            Ok(()) => {
                debug!("Committed {} grants", self.store.len());
                Ok(())
            }
            Err(err) => {
                if let Some(restored) = sync.cached() {
                    if !self.store.is_locked() {
                        self.store.replace(restored.to_vec())?;
                        warn!("Commit failed, local grants restored to last persisted value");
                    }
                }
                Err(err)
            }
        }
    }

    /// Reload the grants from the provider, bypassing the cached copy
    ///
    /// # Errors
    ///
    /// `AccessError::StoreLocked` after `lock()`, `NoSynchronizer` when
    /// none is attached, `PersistenceRead` when the provider fails.
    pub async fn refresh(&mut self) -> Result<()> {
        let sync = self.sync.clone().ok_or(AccessError::NoSynchronizer)?;
        if self.store.is_locked() {
            return Err(AccessError::StoreLocked);
        }

        let fetched = sync.refresh().await?;
        // An update that overlapped the read wins over what it fetched
        let grants = sync.cached().unwrap_or(fetched);
        self.store.replace(grants.to_vec())?;
        info!("Refreshed grants: {} loaded", self.store.len());
        Ok(())
    }
}

impl Default for AccessControl {
    fn default() -> Self {
        Self::new()
    }
}
