//! Matrix service: read and bulk-replace one target's grants for editing
//!
//! `get_matrix` reports the raw persisted rows for the target, never the
//! resolver's merged result, so the editor shows exactly what is stored.

use std::collections::HashMap;

use heed::RoTxn;
use tracing::{debug, warn};

use crate::db::{Dbs, Store};
use crate::error::{err, invalid, not_found, Result};
use crate::grants::{role_grants, user_overrides};
use crate::types::{
    Matrix, MatrixRow, Mode, PermissionCategory, PermissionEntry, PermissionItem, Permissions,
    RoleGrant, UserOverride,
};

/// Raw stored row per item, as (permissions, override_role)
fn stored_rows(d: &Dbs, tx: &RoTxn, mode: &Mode) -> Result<HashMap<String, (Permissions, bool)>> {
    match mode {
        Mode::Role(role) => {
            if d.roles.get(tx, role).map_err(err)?.is_none() {
                return Err(not_found("role", role));
            }
            Ok(role_grants(d, tx, role)?
                .into_iter()
                .map(|g| (g.permission_item_id, (g.permissions, false)))
                .collect())
        }
        Mode::User(user_id) => {
            if d.users.get(tx, user_id).map_err(err)?.is_none() {
                return Err(not_found("user", user_id));
            }
            Ok(user_overrides(d, tx, user_id)?
                .into_iter()
                .map(|o| (o.permission_item_id, (o.permissions, o.override_role)))
                .collect())
        }
    }
}

impl Store {
    /// Categories, items and one raw row per catalog item for the target.
    /// Items without a stored row come back all-false with `stored == false`.
    pub fn get_matrix(&self, mode: &Mode) -> Result<Matrix> {
        let matrix = self.read(|d, tx| {
            let mut stored = stored_rows(d, tx, mode)?;

            let mut categories: Vec<PermissionCategory> = Vec::new();
            for row in d.categories.iter(tx).map_err(err)? {
                categories.push(row.map_err(err)?.1);
            }
            let mut items: Vec<PermissionItem> = Vec::new();
            for row in d.items.iter(tx).map_err(err)? {
                items.push(row.map_err(err)?.1);
            }

            let current_permissions = items
                .iter()
                .map(|item| {
                    let (p, override_role, found) = match stored.remove(&item.id) {
                        Some((p, o)) => (p, o, true),
                        None => (Permissions::DENY, false, false),
                    };
                    MatrixRow {
                        permission_item_id: item.id.clone(),
                        can_view: p.can_view,
                        can_edit: p.can_edit,
                        can_delete: p.can_delete,
                        override_role,
                        stored: found,
                    }
                })
                .collect();

            Ok(Matrix { categories, items, current_permissions })
        })?;
        debug!(subject = %mode, items = matrix.items.len(), "matrix read");
        Ok(matrix)
    }

    /// Validate `entries` and atomically replace the target's whole grant set with them.
    /// On any error the previously stored grants are left untouched.
    pub fn save_matrix(&self, mode: &Mode, entries: &[PermissionEntry]) -> Result<()> {
        let r = match mode {
            Mode::Role(role) => {
                if let Some(e) = entries.iter().find(|e| e.override_role == Some(true)) {
                    let e = invalid(format!(
                        "override_role is only accepted for user targets (item '{}')",
                        e.permission_item_id
                    ));
                    warn!(subject = %mode, error = %e, "matrix save rejected");
                    return Err(e);
                }
                let grants: Vec<RoleGrant> = entries
                    .iter()
                    .map(|e| RoleGrant::new(role, &e.permission_item_id, e.permissions()))
                    .collect();
                self.transact(|tx| tx.replace_role_grants(role, &grants))
            }
            Mode::User(user_id) => {
                let overrides: Vec<UserOverride> = entries
                    .iter()
                    .map(|e| {
                        UserOverride::new(
                            user_id.as_str(),
                            e.permission_item_id.as_str(),
                            e.permissions(),
                            e.override_role.unwrap_or(false),
                        )
                    })
                    .collect();
                self.transact(|tx| tx.replace_user_overrides(user_id, &overrides))
            }
        };
        match r {
            Ok(n) => {
                debug!(subject = %mode, rows = n, "matrix saved");
                Ok(())
            }
            Err(e) => {
                warn!(subject = %mode, error = %e, "matrix save rejected");
                Err(e)
            }
        }
    }
}
