//! Permission queries over a role-set

use crate::resolver;
use crate::types::{Grant, GrantAction, PermissionResult};

/// Query handle returned by `AccessControl::can` and `UserAccessControl::can`
///
/// Borrows the grant set; every query is a pure resolution.
#[derive(Debug, Clone)]
pub struct Permission<'a> {
    grants: &'a [Grant],
    roles: Vec<String>,
}

impl<'a> Permission<'a> {
    pub(crate) fn new(grants: &'a [Grant], roles: Vec<String>) -> Self {
        Self { grants, roles }
    }

    /// Roles consulted, in precedence order
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Resolve `action` on `resource`
    pub fn check(&self, action: GrantAction, resource: &str) -> PermissionResult {
        resolver::resolve(self.grants, &self.roles, action, resource)
    }

    /// Shorthand for `check(..).granted`
    pub fn is_granted(&self, action: GrantAction, resource: &str) -> bool {
        self.check(action, resource).granted
    }

    pub fn create_own(&self, resource: &str) -> PermissionResult {
        self.check(GrantAction::CREATE_OWN, resource)
    }

    pub fn create_any(&self, resource: &str) -> PermissionResult {
        self.check(GrantAction::CREATE_ANY, resource)
    }

    pub fn read_own(&self, resource: &str) -> PermissionResult {
        self.check(GrantAction::READ_OWN, resource)
    }

    pub fn read_any(&self, resource: &str) -> PermissionResult {
        self.check(GrantAction::READ_ANY, resource)
    }

    pub fn update_own(&self, resource: &str) -> PermissionResult {
        self.check(GrantAction::UPDATE_OWN, resource)
    }

    pub fn update_any(&self, resource: &str) -> PermissionResult {
        self.check(GrantAction::UPDATE_ANY, resource)
    }

    pub fn delete_own(&self, resource: &str) -> PermissionResult {
        self.check(GrantAction::DELETE_OWN, resource)
    }

    pub fn delete_any(&self, resource: &str) -> PermissionResult {
        self.check(GrantAction::DELETE_ANY, resource)
    }
}
