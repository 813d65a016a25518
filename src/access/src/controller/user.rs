//! User-scoped access controller

use super::{AccessControl, GrantBuilder, Permission};
use crate::error::{AccessError, Result};
use crate::roles::{RoleAssignments, RoleMapper};
use crate::sync::DataSynchronizer;
use crate::types::{GrantAction, PermissionResult};
use std::sync::Arc;
use tracing::debug;

/// Access controller that evaluates users through their assigned roles
///
/// Roles come from a `RoleMapper`; without one, an owned in-memory
/// `RoleAssignments` is used. A user's roles are consulted in the order the
/// mapper returns them.
pub struct UserAccessControl {
    access: AccessControl,
    roles: Arc<dyn RoleMapper>,
}

impl UserAccessControl {
    /// Controller with in-memory role assignments
    pub fn new(access: AccessControl) -> Self {
        Self::with_mapper(access, Arc::new(RoleAssignments::new()))
    }

    /// Controller with an external role mapper
    pub fn with_mapper(access: AccessControl, roles: Arc<dyn RoleMapper>) -> Self {
        Self { access, roles }
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    pub fn access_mut(&mut self) -> &mut AccessControl {
        &mut self.access
    }

    /// Start authoring grants for `role`
    pub fn grant(&mut self, role: impl Into<String>) -> GrantBuilder<'_> {
        self.access.grant(role)
    }

    /// Lock the underlying grant store
    pub fn lock(&mut self) -> &mut Self {
        self.access.lock();
        self
    }

    /// Replace the roles assigned to `user`
    pub async fn set_roles<I, S>(&self, user: &str, roles: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: Vec<String> = roles.into_iter().map(Into::into).collect();
        self.roles
            .set_roles(user, roles)
            .await
            .map_err(|e| AccessError::RoleMapper(format!("{:#}", e)))
    }

    /// Roles assigned to `user`, in precedence order
    pub async fn roles(&self, user: &str) -> Result<Vec<String>> {
        self.roles
            .parse_roles(user)
            .await
            .map_err(|e| AccessError::RoleMapper(format!("{:#}", e)))
    }

    /// Query permissions of `user` over its current role-set
    pub async fn can(&self, user: &str) -> Result<Permission<'_>> {
        let roles = self.roles(user).await?;
        debug!("User {} resolved to roles {:?}", user, roles);
        Ok(self.access.can_any(roles))
    }

    /// Permission and metadata for (user, resource, action)
    pub async fn get_metadata(&self, user: &str, resource: &str, action: GrantAction) -> Result<PermissionResult> {
        Ok(self.can(user).await?.check(action, resource))
    }

    /// See `AccessControl::connect`
    pub async fn connect(&mut self, sync: Arc<DataSynchronizer>) -> Result<()> {
        self.access.connect(sync).await
    }

    /// See `AccessControl::commit`
    pub async fn commit(&mut self) -> Result<()> {
        self.access.commit().await
    }

    /// See `AccessControl::refresh`
    pub async fn refresh(&mut self) -> Result<()> {
        self.access.refresh().await
    }
}
