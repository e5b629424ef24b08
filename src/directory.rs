//! Known roles and users (matrix targets)

use crate::db::Store;
use crate::error::{err, not_found, Result};
use crate::types::{Actor, RoleRecord, UserRecord};

impl Store {
    pub fn register_role(&self, role: &RoleRecord) -> Result<()> {
        self.transact(|tx| tx.upsert_role(role))
    }

    /// Register or update a user; its role must already exist
    pub fn register_user(&self, user: &UserRecord) -> Result<()> {
        self.transact(|tx| tx.upsert_user(user))
    }

    pub fn list_roles(&self) -> Result<Vec<RoleRecord>> {
        self.read(|d, tx| {
            let mut r = Vec::new();
            for row in d.roles.iter(tx).map_err(err)? {
                r.push(row.map_err(err)?.1);
            }
            Ok(r)
        })
    }

    pub fn list_users(&self) -> Result<Vec<UserRecord>> {
        self.read(|d, tx| {
            let mut r = Vec::new();
            for row in d.users.iter(tx).map_err(err)? {
                r.push(row.map_err(err)?.1);
            }
            Ok(r)
        })
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserRecord>> {
        self.read(|d, tx| d.users.get(tx, id).map_err(err))
    }

    pub fn get_role(&self, id: &str) -> Result<Option<RoleRecord>> {
        self.read(|d, tx| d.roles.get(tx, id).map_err(err))
    }

    /// Actor for a registered user, carrying the user's current role
    pub fn actor_for(&self, user_id: &str) -> Result<Actor> {
        let user = self.get_user(user_id)?.ok_or_else(|| not_found("user", user_id))?;
        Ok(Actor::new(user.role, user.id))
    }

    /// Delete a user together with its overrides
    pub fn remove_user(&self, id: &str) -> Result<usize> {
        self.transact(|tx| tx.remove_user(id))
    }

    /// Delete a role together with its grants; fails while users still hold it
    pub fn remove_role(&self, id: &str) -> Result<usize> {
        self.transact(|tx| tx.remove_role(id))
    }
}
