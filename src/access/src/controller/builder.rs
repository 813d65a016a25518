//! Chainable grant authoring

use super::AccessControl;
use crate::error::Result;
use crate::types::{GrantAction, PolicyMetadata};

/// Authoring handle returned by `AccessControl::grant`
///
/// Each call upserts one policy for the handle's role and hands the
/// builder back, so calls chain with `?`:
///
/// ```rust
/// use cretoai_access::AccessControl;
///
/// # fn example() -> cretoai_access::Result<()> {
/// let mut ac = AccessControl::new();
/// ac.grant("user")
///     .read_any("video", None)?
///     .update_own("video", None)?;
/// # Ok(())
/// # }
/// ```
pub struct GrantBuilder<'a> {
    controller: &'a mut AccessControl,
    role: String,
}

impl<'a> GrantBuilder<'a> {
    pub(crate) fn new(controller: &'a mut AccessControl, role: String) -> Self {
        Self { controller, role }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// Switch the role for the following calls
    pub fn grant(self, role: impl Into<String>) -> Self {
        Self {
            controller: self.controller,
            role: role.into(),
        }
    }

    /// Upsert the policy for `action` on `resource`
    pub fn action(
        self,
        action: GrantAction,
        resource: &str,
        metadata: impl Into<Option<PolicyMetadata>>,
    ) -> Result<Self> {
        self.controller
            .authorize(&self.role, action, resource, metadata.into())?;
        Ok(self)
    }

    pub fn create_own(self, resource: &str, metadata: impl Into<Option<PolicyMetadata>>) -> Result<Self> {
        self.action(GrantAction::CREATE_OWN, resource, metadata)
    }

    pub fn create_any(self, resource: &str, metadata: impl Into<Option<PolicyMetadata>>) -> Result<Self> {
        self.action(GrantAction::CREATE_ANY, resource, metadata)
    }

    pub fn read_own(self, resource: &str, metadata: impl Into<Option<PolicyMetadata>>) -> Result<Self> {
        self.action(GrantAction::READ_OWN, resource, metadata)
    }

    pub fn read_any(self, resource: &str, metadata: impl Into<Option<PolicyMetadata>>) -> Result<Self> {
        self.action(GrantAction::READ_ANY, resource, metadata)
    }

    pub fn update_own(self, resource: &str, metadata: impl Into<Option<PolicyMetadata>>) -> Result<Self> {
        self.action(GrantAction::UPDATE_OWN, resource, metadata)
    }

    pub fn update_any(self, resource: &str, metadata: impl Into<Option<PolicyMetadata>>) -> Result<Self> {
        self.action(GrantAction::UPDATE_ANY, resource, metadata)
    }

    pub fn delete_own(self, resource: &str, metadata: impl Into<Option<PolicyMetadata>>) -> Result<Self> {
        self.action(GrantAction::DELETE_OWN, resource, metadata)
    }

    pub fn delete_any(self, resource: &str, metadata: impl Into<Option<PolicyMetadata>>) -> Result<Self> {
        self.action(GrantAction::DELETE_ANY, resource, metadata)
    }

    /// `*:any`: every action on `resource`
    pub fn all(self, resource: &str, metadata: impl Into<Option<PolicyMetadata>>) -> Result<Self> {
        self.action(GrantAction::ANY, resource, metadata)
    }
}
