//! User to role mapping

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Role mapper consumed by `UserAccessControl`
///
/// The returned role order is the precedence order used when resolving a
/// user's permissions.
#[async_trait]
pub trait RoleMapper: Send + Sync {
    /// Roles assigned to `user`; unknown users have none
    async fn parse_roles(&self, user: &str) -> anyhow::Result<Vec<String>>;

    /// Replace the roles assigned to `user`
    async fn set_roles(&self, user: &str, roles: Vec<String>) -> anyhow::Result<()>;
}

/// In-memory role assignments, used when no external mapper is supplied
#[derive(Clone, Default)]
pub struct RoleAssignments {
    assignments: Arc<RwLock<HashMap<String, Vec<String>>>>,
}

impl RoleAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with an assignment
    pub async fn len(&self) -> usize {
        self.assignments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.assignments.read().await.is_empty()
    }
}

#[async_trait]
impl RoleMapper for RoleAssignments {
    async fn parse_roles(&self, user: &str) -> anyhow::Result<Vec<String>> {
        let assignments = self.assignments.read().await;
        Ok(assignments.get(user).cloned().unwrap_or_default())
    }

    async fn set_roles(&self, user: &str, roles: Vec<String>) -> anyhow::Result<()> {
        let mut deduped: Vec<String> = Vec::with_capacity(roles.len());
        for role in roles {
            if !deduped.contains(&role) {
                deduped.push(role);
            }
        }

        debug!("Assigning roles {:?} to user {}", deduped, user);
        let mut assignments = self.assignments.write().await;
        assignments.insert(user.to_string(), deduped);
        Ok(())
    }
}
