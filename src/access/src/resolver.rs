//! Policy resolution
//!
//! Maps (grants, role-set, action, resource) to a `PermissionResult`.
//!
//! # Precedence
//!
//! ```text
//! roles (caller order) → grant for (role, resource) → policies (insertion order)
//!                                                          ↓
//!                                             first satisfying policy wins
//! ```
//!
//! Roles are checked in the order supplied, not by specificity. Callers that
//! combine conflicting roles must order them by desired precedence.

use crate::types::{Grant, GrantAction, PermissionResult, Policy};
use tracing::{debug, trace};

/// Resolve `action` on `resource` for a role-set
///
/// Absence of a matching grant or policy is a denial, never an error.
pub fn resolve<R>(grants: &[Grant], roles: &[R], action: GrantAction, resource: &str) -> PermissionResult
where
    R: AsRef<str>,
{
    for role in roles {
        let role = role.as_ref();

        let Some(grant) = grants
            .iter()
            .find(|g| g.role == role && g.resource == resource)
        else {
            trace!("No grant for role={}, resource={}", role, resource);
            continue;
        };

        if let Some(policy) = matching_policy(grant, action) {
            debug!(
                "Granted {} on {} to role {} via policy {}",
                action, resource, role, policy.action
            );
            return PermissionResult::granted(policy.metadata.clone());
        }
    }

    debug!(
        "Denied {} on {} for roles {:?}",
        action,
        resource,
        roles.iter().map(AsRef::as_ref).collect::<Vec<&str>>()
    );
    PermissionResult::denied()
}

/// Resolve for a single role
pub fn resolve_role(grants: &[Grant], role: &str, action: GrantAction, resource: &str) -> PermissionResult {
    resolve(grants, &[role], action, resource)
}

/// First policy of `grant`, in insertion order, that satisfies `action`
pub fn matching_policy(grant: &Grant, action: GrantAction) -> Option<&Policy> {
    grant.policies.iter().find(|p| p.action.satisfies(&action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GrantAttribute, PolicyMetadata};

    fn video_grants() -> Vec<Grant> {
        vec![
            Grant::new("user", "video")
                .with_policy(GrantAction::READ_OWN, PolicyMetadata::new(["title"]))
                .with_policy(GrantAction::UPDATE_ANY, PolicyMetadata::new(["*", "!owner"])),
            Grant::new("admin", "video")
                .with_policy(GrantAction::ANY, PolicyMetadata::default()),
        ]
    }

    #[test]
    fn test_exact_match() {
        let result = resolve_role(&video_grants(), "user", GrantAction::READ_OWN, "video");
        assert!(result.granted);
        assert_eq!(result.attributes(), &[GrantAttribute::include("title")]);
    }

    #[test]
    fn test_own_request_subsumed_by_any() {
        let result = resolve_role(&video_grants(), "user", GrantAction::UPDATE_OWN, "video");
        assert!(result.granted);
        assert_eq!(result.metadata, Some(PolicyMetadata::new(["*", "!owner"])));
    }

    #[test]
    fn test_own_does_not_grant_any() {
        let result = resolve_role(&video_grants(), "user", GrantAction::READ_ANY, "video");
        assert_eq!(result, PermissionResult::denied());
    }

    #[test]
    fn test_wildcard_grants_everything() {
        for action in GrantAction::ALL {
            assert!(resolve_role(&video_grants(), "admin", action, "video").granted);
        }
    }

    #[test]
    fn test_unknown_role_or_resource_is_denied() {
        let grants = video_grants();
        assert_eq!(resolve_role(&grants, "guest", GrantAction::READ_OWN, "video"), PermissionResult::denied());
        assert_eq!(resolve_role(&grants, "admin", GrantAction::READ_OWN, "photo"), PermissionResult::denied());
        assert_eq!(resolve_role(&[], "admin", GrantAction::READ_OWN, "video"), PermissionResult::denied());
    }

    #[test]
    fn test_insertion_order_decides_between_policies() {
        let grants = vec![Grant::new("editor", "post")
            .with_policy(GrantAction::READ_ANY, PolicyMetadata::new(["body"]))
            .with_policy(GrantAction::READ_OWN, PolicyMetadata::new(["*"]))];

        // read:any was inserted first and subsumes read:own
        let result = resolve_role(&grants, "editor", GrantAction::READ_OWN, "post");
        assert_eq!(result.metadata, Some(PolicyMetadata::new(["body"])));
    }

    #[test]
    fn test_role_order_is_precedence() {
        let grants = vec![
            Grant::new("viewer", "post").with_policy(GrantAction::READ_ANY, PolicyMetadata::new(["title"])),
            Grant::new("editor", "post").with_policy(GrantAction::READ_ANY, PolicyMetadata::default()),
        ];

        let result = resolve(&grants, &["editor", "viewer"], GrantAction::READ_ANY, "post");
        assert_eq!(result.metadata, Some(PolicyMetadata::default()));

        let result = resolve(&grants, &["viewer", "editor"], GrantAction::READ_ANY, "post");
        assert_eq!(result.metadata, Some(PolicyMetadata::new(["title"])));

        // Roles without a grant are skipped
        let result = resolve(&grants, &["guest", "viewer"], GrantAction::READ_OWN, "post");
        assert!(result.granted);
    }

    #[test]
    fn test_empty_role_set_is_denied() {
        let roles: Vec<String> = Vec::new();
        assert!(!resolve(&video_grants(), &roles, GrantAction::READ_OWN, "video").granted);
    }
}
