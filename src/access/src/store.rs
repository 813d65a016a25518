//! Grant storage
//!
//! The `GrantStore` is the canonical, flat representation of grants: an
//! ordered sequence holding at most one `Grant` per (role, resource) pair.
//! The nested role → resource → action view is derived from it on demand.

use crate::error::{AccessError, Result};
use crate::types::{Grant, GrantAction, PolicyMetadata, ResourceId, RoleId};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Read-only nested projection: role → resource → action → metadata
pub type NestedGrants = BTreeMap<RoleId, BTreeMap<ResourceId, BTreeMap<GrantAction, PolicyMetadata>>>;

/// Ordered grant collection with an irreversible lock
#[derive(Debug, Clone, Default)]
pub struct GrantStore {
    grants: Vec<Grant>,
    locked: bool,
}

impl GrantStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from an existing collection
    ///
    /// Repeated (role, resource) grants are merged into the first
    /// occurrence; later policies replace earlier ones for the same action.
    pub fn from_grants(grants: Vec<Grant>) -> Self {
        Self {
            grants: normalize(grants),
            locked: false,
        }
    }

    /// Find the grant for a (role, resource) pair
    pub fn find_grant(&self, role: &str, resource: &str) -> Option<&Grant> {
        self.grants
            .iter()
            .find(|g| g.role == role && g.resource == resource)
    }

    /// Create or replace the policy for `action` on (role, resource)
    ///
    /// # Errors
    ///
    /// Returns `AccessError::StoreLocked` once the store is locked.
    pub fn upsert_policy(
        &mut self,
        role: &str,
        resource: &str,
        action: GrantAction,
        metadata: PolicyMetadata,
    ) -> Result<()> {
        if self.locked {
            return Err(AccessError::StoreLocked);
        }

        debug!("Upserting policy: role={}, resource={}, action={}", role, resource, action);

        match self
            .grants
            .iter_mut()
            .find(|g| g.role == role && g.resource == resource)
        {
            Some(grant) => grant.upsert(action, metadata),
            None => self
                .grants
                .push(Grant::new(role, resource).with_policy(action, metadata)),
        }

        Ok(())
    }

    /// Swap the whole collection, e.g. after a provider refresh
    pub fn replace(&mut self, grants: Vec<Grant>) -> Result<()> {
        if self.locked {
            return Err(AccessError::StoreLocked);
        }

        self.grants = normalize(grants);
        debug!("Grant store replaced: {} grants", self.grants.len());
        Ok(())
    }

    /// Lock the store; every later mutation fails
    pub fn lock(&mut self) {
        if !self.locked {
            info!("Grant store locked with {} grants", self.grants.len());
        }
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Grants in insertion order
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Derived nested view of the store
    pub fn nested(&self) -> NestedGrants {
        let mut nested = NestedGrants::new();

        for grant in &self.grants {
            let actions = nested
                .entry(grant.role.clone())
                .or_default()
                .entry(grant.resource.clone())
                .or_default();

            for policy in &grant.policies {
                actions.insert(policy.action, policy.metadata.clone());
            }
        }

        nested
    }
}

fn normalize(grants: Vec<Grant>) -> Vec<Grant> {
    let mut merged: Vec<Grant> = Vec::with_capacity(grants.len());

    for grant in grants {
        match merged
            .iter_mut()
            .find(|g| g.role == grant.role && g.resource == grant.resource)
        {
            Some(existing) => {
                for policy in grant.policies {
                    existing.upsert(policy.action, policy.metadata);
                }
            }
            None => {
                let mut fresh = Grant::new(grant.role, grant.resource);
                for policy in grant.policies {
                    fresh.upsert(policy.action, policy.metadata);
                }
                merged.push(fresh);
            }
        }
    }

    merged
}
