//! End-to-end access control tests
//!
//! Authoring → resolution → attribute filtering, for roles and users.

use cretoai_access::{
    filter, AccessConfig, AccessControl, AccessError, GrantAction, GrantAttribute,
    PermissionResult, PolicyMetadata, UserAccessControl,
};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct Account {
    id: u64,
    email: String,
    password: String,
    balance: i64,
}

fn account() -> Account {
    Account {
        id: 7,
        email: "alice@example.com".to_string(),
        password: "hunter2".to_string(),
        balance: 120,
    }
}

// ============================================================================
// ROLE-BASED FLOW
// ============================================================================

#[test]
fn test_admin_reads_video_without_password() {
    let mut ac = AccessControl::new();
    ac.grant("admin")
        .read_any("video", PolicyMetadata::new(["*", "!password"]))
        .unwrap();

    let permission = ac.can("admin").read_own("video");
    assert!(permission.granted, "read:own should be subsumed by read:any");
    assert_eq!(
        permission.attributes(),
        &[GrantAttribute::All, GrantAttribute::exclude("password")]
    );

    let view = filter::filter_value(&json!({"title": "x", "password": "y"}), permission.attributes());
    assert_eq!(view, json!({"title": "x"}));
}

#[test]
fn test_get_metadata_for_unknown_combinations() {
    let mut ac = AccessControl::new();
    ac.grant("user").read_any("video", None).unwrap();

    assert_eq!(ac.get_metadata("user", "photo", GrantAction::READ_ANY), PermissionResult::denied());
    assert_eq!(ac.get_metadata("guest", "video", GrantAction::READ_ANY), PermissionResult::denied());
    assert_eq!(ac.get_metadata("user", "video", GrantAction::DELETE_ANY), PermissionResult::denied());
    assert!(ac.attributes("user", "video", GrantAction::DELETE_ANY).is_empty());
}

#[test]
fn test_regrant_replaces_attribute_list() {
    let mut ac = AccessControl::new();
    ac.grant("user")
        .read_any("video", PolicyMetadata::new(["title"]))
        .unwrap()
        .read_any("video", PolicyMetadata::new(["title", "duration"]))
        .unwrap();

    let grant = ac.store().find_grant("user", "video").unwrap();
    assert_eq!(grant.policies.len(), 1);
    assert_eq!(grant.policies[0].metadata, PolicyMetadata::new(["title", "duration"]));
}

#[test]
fn test_typed_projection_per_role() {
    let mut ac = AccessControl::new();
    ac.grant("owner")
        .read_own("account", PolicyMetadata::new(["*", "!password"]))
        .unwrap()
        .grant("support")
        .read_any("account", PolicyMetadata::new(["id", "email"]))
        .unwrap();

    let owner_view = ac
        .project("owner", "account", GrantAction::READ_OWN, &account())
        .unwrap()
        .unwrap();
    assert_eq!(owner_view, json!({"id": 7, "email": "alice@example.com", "balance": 120}));

    let support_view = ac
        .project("support", "account", GrantAction::READ_OWN, &account())
        .unwrap()
        .unwrap();
    assert_eq!(support_view, json!({"id": 7, "email": "alice@example.com"}));

    // read:own does not grant read:any
    assert!(ac
        .project("owner", "account", GrantAction::READ_ANY, &account())
        .unwrap()
        .is_none());
}

#[test]
fn test_locking_freezes_visible_grants() {
    let mut ac = AccessControl::new();
    ac.grant("user").read_own("video", None).unwrap();
    let before = ac.dump_grants();

    ac.lock();
    assert!(matches!(
        ac.authorize("user", GrantAction::UPDATE_ANY, "video", None),
        Err(AccessError::StoreLocked)
    ));
    assert!(matches!(
        ac.grant("admin").all("video", None),
        Err(AccessError::StoreLocked)
    ));

    assert_eq!(ac.dump_grants(), before);
    assert!(ac.can("user").read_own("video").granted);
}

#[test]
fn test_configured_default_attributes() {
    let config = AccessConfig::from_lookup(|key| match key {
        "ACCESS_DEFAULT_ATTRIBUTES" => Some("*,!internal_notes".to_string()),
        _ => None,
    });
    let mut ac = AccessControl::with_config(config);
    ac.grant("agent").read_any("ticket", None).unwrap();

    let ticket = json!({"subject": "login", "internal_notes": "vip"});
    let view = ac.project("agent", "ticket", GrantAction::READ_ANY, &ticket).unwrap();
    assert_eq!(view, Some(json!({"subject": "login"})));
}

#[test]
fn test_grants_serialize_for_persistence() {
    let mut ac = AccessControl::new();
    ac.grant("user")
        .read_any("video", PolicyMetadata::new(["*", "!password"]))
        .unwrap()
        .delete_own("video", None)
        .unwrap();

    let json = serde_json::to_value(ac.grants()).unwrap();
    assert_eq!(
        json,
        json!([{
            "role": "user",
            "resource": "video",
            "policies": [
                {"action": "read:any", "metadata": {"attributes": ["*", "!password"]}},
                {"action": "delete:own", "metadata": {"attributes": ["*"]}}
            ]
        }])
    );

    let restored = AccessControl::from_grants(serde_json::from_value(json).unwrap());
    assert_eq!(restored.grants(), ac.grants());
}

// ============================================================================
// USER-BASED FLOW
// ============================================================================

#[test]
fn test_user_flow() {
    tokio_test::block_on(async {
        let mut ac = AccessControl::new();
        ac.grant("member")
            .read_own("account", PolicyMetadata::new(["*", "!password"]))
            .unwrap()
            .grant("auditor")
            .read_any("account", PolicyMetadata::new(["id", "balance"]))
            .unwrap();

        let uac = UserAccessControl::new(ac);
        uac.set_roles("alice", ["member"]).await.unwrap();
        uac.set_roles("erin", ["auditor", "member"]).await.unwrap();

        let alice = uac.can("alice").await.unwrap();
        assert!(alice.read_own("account").granted);
        assert!(!alice.read_any("account").granted);

        // auditor comes first for erin, so its attribute list wins
        let erin = uac.get_metadata("erin", "account", GrantAction::READ_OWN).await.unwrap();
        let view = filter::filter(&account(), erin.attributes()).unwrap();
        assert_eq!(view, json!({"id": 7, "balance": 120}));

        assert_eq!(uac.roles("erin").await.unwrap(), vec!["auditor", "member"]);
        assert!(uac.roles("mallory").await.unwrap().is_empty());
    });
}
