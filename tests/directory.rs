//! Role and user directory tests

mod common;

use common::*;
use grantmatrix::{Error, Mode};

/// Verify the directory lists seeded roles and users in id order
#[test]
fn lists_targets() {
    let (_dir, store) = seeded();
    let roles: Vec<_> = store.list_roles().unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(roles, vec!["admin", "staff"]);
    let users: Vec<_> = store.list_users().unwrap().into_iter().map(|u| u.id).collect();
    assert_eq!(users, vec!["a1", "u1", "u2"]);
    assert_eq!(store.get_role("staff").unwrap().unwrap().display_name, "staff");
    assert!(store.get_user("nobody").unwrap().is_none());
}

/// Verify a user needs a registered role
#[test]
fn user_needs_known_role() {
    let (_dir, store) = seeded();
    assert!(matches!(store.register_user(&user("u9", "contractor")), Err(Error::NotFound(_))));
    assert!(store.get_user("u9").unwrap().is_none());
}

/// Verify actor_for carries the user's role and rejects unknown users
#[test]
fn actor_for_user() {
    let (_dir, store) = seeded();
    let a = store.actor_for("a1").unwrap();
    assert_eq!(a.role, "admin");
    assert_eq!(a.user_id, "a1");
    assert!(matches!(store.actor_for("ghost"), Err(Error::NotFound(_))));
}

/// Verify ids unusable as keys are refused
#[test]
fn bad_ids_rejected() {
    let (_dir, store) = seeded();
    assert!(matches!(store.register_role(&role("")), Err(Error::Validation(_))));
    assert!(matches!(store.register_user(&user("a\0b", "staff")), Err(Error::Validation(_))));
    assert!(matches!(store.register_role(&role(&"r".repeat(300))), Err(Error::Validation(_))));
}

/// Verify removing a user deletes its overrides
#[test]
fn remove_user_cascades_overrides() {
    let (_dir, store) = seeded();
    save_user(&store, "u1", &[override_entry(CLIENTS_VIEW, p(true, false, false), true)]);
    assert_eq!(store.remove_user("u1").unwrap(), 1);
    assert!(store.get_user_overrides("u1").unwrap().is_empty());
    assert!(matches!(store.get_matrix(&Mode::User("u1".into())), Err(Error::NotFound(_))));
    assert!(matches!(store.remove_user("u1"), Err(Error::NotFound(_))));
}

/// Verify a role still held by users cannot be removed
#[test]
fn remove_held_role_refused() {
    let (_dir, store) = seeded();
    save_role(&store, "staff", &[entry(CLIENTS_VIEW, p(true, false, false))]);
    assert!(matches!(store.remove_role("staff"), Err(Error::Validation(_))));
    assert_eq!(store.get_role_grants("staff").unwrap().len(), 1);
}

/// Verify removing an unheld role deletes its grants
#[test]
fn remove_role_cascades_grants() {
    let (_dir, store) = seeded();
    store.register_role(&role("auditor")).unwrap();
    save_role(&store, "auditor", &[entry(CONTRACTS_VIEW, p(true, false, false))]);

    assert_eq!(store.remove_role("auditor").unwrap(), 1);
    assert!(store.get_role("auditor").unwrap().is_none());
    assert!(store.get_role_grants("auditor").unwrap().is_empty());
    assert!(matches!(store.remove_role("auditor"), Err(Error::NotFound(_))));
}
