//! Effective permission resolution
//!
//! Precedence: an active user override beats the role grant, which beats
//! default deny. Each row is authoritative as a whole; values are never
//! merged field by field across the two sources.

use heed::RoTxn;
use tracing::debug;

use crate::constants::caps_to_names;
use crate::db::{Dbs, Store};
use crate::error::{err, Result};
use crate::grants::{role_grant, user_override};
use crate::types::{Action, Actor, Permissions, RoleGrant, UserOverride};

/// Resolve the effective triple from the two possible stored rows
#[inline]
pub fn resolve(
    user_override: Option<&UserOverride>,
    role_grant: Option<&RoleGrant>,
) -> Permissions {
    match (user_override, role_grant) {
        (Some(o), _) if o.override_role => o.permissions,
        (_, Some(g)) => g.permissions,
        _ => Permissions::DENY,
    }
}

/// Only consults the role grant when no active override exists
pub(crate) fn effective_in(d: &Dbs, tx: &RoTxn, actor: &Actor, item: &str) -> Result<Permissions> {
    let o = user_override(d, tx, &actor.user_id, item)?;
    if let Some(o) = o.as_ref().filter(|o| o.override_role) {
        return Ok(resolve(Some(o), None));
    }
    let g = role_grant(d, tx, &actor.role, item)?;
    Ok(resolve(o.as_ref(), g.as_ref()))
}

impl Store {
    /// Effective view/edit/delete for `actor` on `item_id`.
    /// Missing data is default deny, including an item id unknown to the catalog.
    pub fn effective(&self, actor: &Actor, item_id: &str) -> Result<Permissions> {
        let p = self.read(|d, tx| effective_in(d, tx, actor, item_id))?;
        debug!(
            user = %actor.user_id,
            role = %actor.role,
            item = item_id,
            caps = ?caps_to_names(p.mask()),
            "resolved"
        );
        Ok(p)
    }

    /// Check a single action
    #[inline]
    pub fn allows(&self, actor: &Actor, item_id: &str, action: Action) -> Result<bool> {
        Ok(self.effective(actor, item_id)?.allows(action))
    }

    /// Effective permissions for every catalog item, from one snapshot
    pub fn effective_all(&self, actor: &Actor) -> Result<Vec<(String, Permissions)>> {
        self.read(|d, tx| {
            let mut ids = Vec::new();
            for row in d.items.iter(tx).map_err(err)? {
                ids.push(row.map_err(err)?.0.to_string());
            }
            let mut r = Vec::with_capacity(ids.len());
            for id in ids {
                let p = effective_in(d, tx, actor, &id)?;
                r.push((id, p));
            }
            Ok(r)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(v: bool, e: bool, d: bool) -> RoleGrant {
        RoleGrant::new("staff", "clients.delete", Permissions::new(v, e, d))
    }

    fn ovr(v: bool, e: bool, d: bool, active: bool) -> UserOverride {
        UserOverride::new("u1", "clients.delete", Permissions::new(v, e, d), active)
    }

    #[test]
    fn nothing_stored_denies() {
        assert_eq!(resolve(None, None), Permissions::DENY);
    }

    #[test]
    fn role_grant_applies_without_override() {
        let r = resolve(None, Some(&grant(true, true, false)));
        assert_eq!(r, Permissions::new(true, true, false));
    }

    #[test]
    fn active_override_beats_role_grant() {
        let r = resolve(Some(&ovr(false, false, false, true)), Some(&grant(true, true, true)));
        assert_eq!(r, Permissions::DENY);
    }

    #[test]
    fn active_override_applies_without_role_grant() {
        let r = resolve(Some(&ovr(true, false, true, true)), None);
        assert_eq!(r, Permissions::new(true, false, true));
    }

    #[test]
    fn inert_override_is_ignored() {
        let r = resolve(Some(&ovr(true, true, true, false)), Some(&grant(true, false, false)));
        assert_eq!(r, Permissions::new(true, false, false));
        assert_eq!(resolve(Some(&ovr(true, true, true, false)), None), Permissions::DENY);
    }

    #[test]
    fn override_never_borrows_role_fields() {
        let r = resolve(Some(&ovr(true, false, false, true)), Some(&grant(true, true, true)));
        assert_eq!(r, Permissions::new(true, false, false));
    }
}
