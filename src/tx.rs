//! Transaction wrapper for writes

use std::collections::HashSet;

use heed::RwTxn;
use tracing::{debug, info};

use crate::db::Dbs;
use crate::error::{err, invalid, not_found, Result};
use crate::types::{
    validate_id, PermissionCategory, PermissionItem, RoleGrant, RoleRecord, UserOverride,
    UserRecord,
};

/// Write transaction over every table. Dropped without `commit` means rolled back.
pub struct Tx<'e> {
    txn: RwTxn<'e>,
    dbs: Dbs,
}

impl<'e> Tx<'e> {
    #[inline]
    pub(crate) fn new(txn: RwTxn<'e>, dbs: Dbs) -> Self {
        Tx { txn, dbs }
    }

    #[cfg(test)]
    pub(crate) fn tx(&mut self) -> &mut RwTxn<'e> {
        &mut self.txn
    }

    #[cfg(test)]
    pub(crate) fn dbs(&self) -> Dbs {
        self.dbs
    }

    #[inline]
    pub(crate) fn commit(self) -> Result<()> {
        self.txn.commit().map_err(err)
    }

    // Catalog

    pub fn upsert_category(&mut self, category: &PermissionCategory) -> Result<()> {
        validate_id("category", &category.id)?;
        self.dbs.categories.put(&mut self.txn, &category.id, category).map_err(err)
    }

    /// The item's category must already exist
    pub fn upsert_item(&mut self, item: &PermissionItem) -> Result<()> {
        validate_id("permission item", &item.id)?;
        if self.dbs.categories.get(&self.txn, &item.category_id).map_err(err)?.is_none() {
            return Err(not_found("category", &item.category_id));
        }
        self.dbs.items.put(&mut self.txn, &item.id, item).map_err(err)
    }

    /// Delete an item and every grant that references it. Returns the number of grant rows removed.
    pub fn retire_item(&mut self, id: &str) -> Result<usize> {
        if !self.dbs.items.delete(&mut self.txn, id).map_err(err)? {
            return Err(not_found("permission item", id));
        }
        let roles = self.dbs.role_grants.clear_rev(&mut self.txn, id)?;
        let users = self.dbs.user_overrides.clear_rev(&mut self.txn, id)?;
        info!(item = id, role_grants = roles, user_overrides = users, "permission item retired");
        Ok(roles + users)
    }

    /// Retire every item in the category, then the category itself
    pub fn retire_category(&mut self, id: &str) -> Result<usize> {
        if self.dbs.categories.get(&self.txn, id).map_err(err)?.is_none() {
            return Err(not_found("category", id));
        }
        let mut owned = Vec::new();
        for row in self.dbs.items.iter(&self.txn).map_err(err)? {
            let (item_id, item) = row.map_err(err)?;
            if item.category_id == id {
                owned.push(item_id.to_string());
            }
        }
        let mut removed = 0;
        for item_id in &owned {
            removed += self.retire_item(item_id)?;
        }
        self.dbs.categories.delete(&mut self.txn, id).map_err(err)?;
        info!(category = id, items = owned.len(), "category retired");
        Ok(removed)
    }

    // Directory

    pub fn upsert_role(&mut self, role: &RoleRecord) -> Result<()> {
        validate_id("role", &role.id)?;
        self.dbs.roles.put(&mut self.txn, &role.id, role).map_err(err)
    }

    /// The user's role must already be registered
    pub fn upsert_user(&mut self, user: &UserRecord) -> Result<()> {
        validate_id("user", &user.id)?;
        self.require_role(&user.role)?;
        self.dbs.users.put(&mut self.txn, &user.id, user).map_err(err)
    }

    /// Delete a user and all of its overrides
    pub fn remove_user(&mut self, id: &str) -> Result<usize> {
        if !self.dbs.users.delete(&mut self.txn, id).map_err(err)? {
            return Err(not_found("user", id));
        }
        let removed = self.dbs.user_overrides.clear_fwd(&mut self.txn, id)?;
        info!(user = id, user_overrides = removed, "user removed");
        Ok(removed)
    }

    /// Delete a role and its grants. Refused while any user still holds it.
    pub fn remove_role(&mut self, id: &str) -> Result<usize> {
        self.require_role(id)?;
        for row in self.dbs.users.iter(&self.txn).map_err(err)? {
            let (user_id, user) = row.map_err(err)?;
            if user.role == id {
                return Err(invalid(format!("role '{}' is still held by user '{}'", id, user_id)));
            }
        }
        self.dbs.roles.delete(&mut self.txn, id).map_err(err)?;
        let removed = self.dbs.role_grants.clear_fwd(&mut self.txn, id)?;
        info!(role = id, role_grants = removed, "role removed");
        Ok(removed)
    }

    // Grants

    /// Replace every grant of `role` with `grants`. Validation runs before the first mutation.
    pub fn replace_role_grants(&mut self, role: &str, grants: &[RoleGrant]) -> Result<usize> {
        self.require_role(role)?;
        if let Some(g) = grants.iter().find(|g| g.role != role) {
            return Err(invalid(format!(
                "grant for role '{}' submitted while replacing role '{}'",
                g.role, role
            )));
        }
        self.check_items(grants.iter().map(|g| g.permission_item_id.as_str()))?;

        let removed = self.dbs.role_grants.clear_fwd(&mut self.txn, role)?;
        for g in grants {
            let mask = g.permissions.mask();
            self.dbs.role_grants.put(&mut self.txn, role, &g.permission_item_id, mask)?;
        }
        debug!(role, removed, inserted = grants.len(), "role grants replaced");
        Ok(grants.len())
    }

    /// Replace every override of `user_id` with `overrides`.
    /// Validation runs before the first mutation.
    pub fn replace_user_overrides(
        &mut self,
        user_id: &str,
        overrides: &[UserOverride],
    ) -> Result<usize> {
        self.require_user(user_id)?;
        if let Some(o) = overrides.iter().find(|o| o.user_id != user_id) {
            return Err(invalid(format!(
                "override for user '{}' submitted while replacing user '{}'",
                o.user_id, user_id
            )));
        }
        self.check_items(overrides.iter().map(|o| o.permission_item_id.as_str()))?;

        let removed = self.dbs.user_overrides.clear_fwd(&mut self.txn, user_id)?;
        for o in overrides {
            self.dbs.user_overrides.put(&mut self.txn, user_id, &o.permission_item_id, o.mask())?;
        }
        debug!(user = user_id, removed, inserted = overrides.len(), "user overrides replaced");
        Ok(overrides.len())
    }

    fn require_role(&self, id: &str) -> Result<()> {
        match self.dbs.roles.get(&self.txn, id).map_err(err)? {
            Some(_) => Ok(()),
            None => Err(not_found("role", id)),
        }
    }

    fn require_user(&self, id: &str) -> Result<()> {
        match self.dbs.users.get(&self.txn, id).map_err(err)? {
            Some(_) => Ok(()),
            None => Err(not_found("user", id)),
        }
    }

    /// Every id must be a catalog item and appear once
    fn check_items<'a>(&self, ids: impl Iterator<Item = &'a str>) -> Result<()> {
        let mut seen = HashSet::new();
        for id in ids {
            validate_id("permission item", id)?;
            if !seen.insert(id) {
                return Err(invalid(format!("duplicate permission item '{}'", id)));
            }
            if self.dbs.items.get(&self.txn, id).map_err(err)?.is_none() {
                return Err(invalid(format!("unknown permission item '{}'", id)));
            }
        }
        Ok(())
    }
}
