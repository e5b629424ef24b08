//! Grant store: per-role grants and per-user overrides
//!
//! Rows are only ever replaced wholesale per target. Absence of a row is
//! returned as `None`, never as a zeroed grant, so "not configured" and
//! "explicitly denied" stay distinct.

use heed::RoTxn;

use crate::db::{Dbs, Store};
use crate::error::Result;
use crate::types::{Permissions, RoleGrant, UserOverride};

pub(crate) fn role_grant(d: &Dbs, tx: &RoTxn, role: &str, item: &str) -> Result<Option<RoleGrant>> {
    Ok(d.role_grants
        .get(tx, role, item)?
        .map(|m| RoleGrant::new(role, item, Permissions::from_mask(m))))
}

pub(crate) fn user_override(
    d: &Dbs,
    tx: &RoTxn,
    user_id: &str,
    item: &str,
) -> Result<Option<UserOverride>> {
    Ok(d.user_overrides
        .get(tx, user_id, item)?
        .map(|m| UserOverride::from_mask(user_id, item.to_string(), m)))
}

pub(crate) fn role_grants(d: &Dbs, tx: &RoTxn, role: &str) -> Result<Vec<RoleGrant>> {
    Ok(d.role_grants
        .list_fwd(tx, role)?
        .into_iter()
        .map(|(item, m)| RoleGrant::new(role, item, Permissions::from_mask(m)))
        .collect())
}

pub(crate) fn user_overrides(d: &Dbs, tx: &RoTxn, user_id: &str) -> Result<Vec<UserOverride>> {
    Ok(d.user_overrides
        .list_fwd(tx, user_id)?
        .into_iter()
        .map(|(item, m)| UserOverride::from_mask(user_id, item, m))
        .collect())
}

impl Store {
    /// Stored grants of a role (possibly empty), ordered by item id
    pub fn get_role_grants(&self, role: &str) -> Result<Vec<RoleGrant>> {
        self.read(|d, tx| role_grants(d, tx, role))
    }

    /// Atomically swap the role's whole grant set for `grants`
    pub fn replace_role_grants(&self, role: &str, grants: &[RoleGrant]) -> Result<()> {
        self.transact(|tx| tx.replace_role_grants(role, grants)).map(|_| ())
    }

    /// Stored overrides of a user (possibly empty), ordered by item id
    pub fn get_user_overrides(&self, user_id: &str) -> Result<Vec<UserOverride>> {
        self.read(|d, tx| user_overrides(d, tx, user_id))
    }

    /// Atomically swap the user's whole override set for `overrides`
    pub fn replace_user_overrides(&self, user_id: &str, overrides: &[UserOverride]) -> Result<()> {
        self.transact(|tx| tx.replace_user_overrides(user_id, overrides)).map(|_| ())
    }

    pub fn get_role_grant(&self, role: &str, item: &str) -> Result<Option<RoleGrant>> {
        self.read(|d, tx| role_grant(d, tx, role, item))
    }

    pub fn get_user_override(&self, user_id: &str, item: &str) -> Result<Option<UserOverride>> {
        self.read(|d, tx| user_override(d, tx, user_id, item))
    }
}
