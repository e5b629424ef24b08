//! Shared fixture: a fresh LMDB environment seeded with a small catalog

#![allow(dead_code)]

use grantmatrix::{
    Mode, PermissionCategory, PermissionEntry, PermissionItem, Permissions, RoleRecord, Seed, Store,
    UserRecord,
};
use tempfile::TempDir;

pub const CLIENTS_VIEW: &str = "clients.view";
pub const CLIENTS_EDIT: &str = "clients.edit";
pub const CLIENTS_DELETE: &str = "clients.delete";
pub const CONTRACTS_VIEW: &str = "contracts.view";

pub fn category(id: &str) -> PermissionCategory {
    PermissionCategory { id: id.into(), display_name: id.to_uppercase(), description: None }
}

pub fn item(id: &str, category_id: &str) -> PermissionItem {
    PermissionItem {
        id: id.into(),
        category_id: category_id.into(),
        display_name: id.into(),
        description: None,
    }
}

pub fn role(id: &str) -> RoleRecord {
    RoleRecord { id: id.into(), display_name: id.into() }
}

pub fn user(id: &str, role: &str) -> UserRecord {
    UserRecord { id: id.into(), display_name: id.into(), role: role.into() }
}

pub fn seed() -> Seed {
    Seed {
        categories: vec![category("clients"), category("contracts")],
        items: vec![
            item(CLIENTS_VIEW, "clients"),
            item(CLIENTS_EDIT, "clients"),
            item(CLIENTS_DELETE, "clients"),
            item(CONTRACTS_VIEW, "contracts"),
        ],
        roles: vec![role("admin"), role("staff")],
        users: vec![user("u1", "staff"), user("u2", "staff"), user("a1", "admin")],
    }
}

/// Empty store; keep the TempDir alive for the whole test
pub fn empty() -> (TempDir, Store) {
    let dir = TempDir::new().unwrap();
    let store = Store::open_with_map_size(dir.path(), 16 << 20).unwrap();
    (dir, store)
}

/// Store provisioned with `seed()`
pub fn seeded() -> (TempDir, Store) {
    let (dir, store) = empty();
    store.provision(&seed()).unwrap();
    (dir, store)
}

pub fn p(v: bool, e: bool, d: bool) -> Permissions {
    Permissions::new(v, e, d)
}

pub fn entry(item: &str, perms: Permissions) -> PermissionEntry {
    PermissionEntry::new(item, perms, None)
}

pub fn override_entry(item: &str, perms: Permissions, override_role: bool) -> PermissionEntry {
    PermissionEntry::new(item, perms, Some(override_role))
}

/// Replace a role's grants; the save must succeed
pub fn save_role(store: &Store, role: &str, rows: &[PermissionEntry]) {
    store.save_matrix(&Mode::Role(role.into()), rows).unwrap();
}

/// Replace a user's overrides; the save must succeed
pub fn save_user(store: &Store, user_id: &str, rows: &[PermissionEntry]) {
    store.save_matrix(&Mode::User(user_id.into()), rows).unwrap();
}
