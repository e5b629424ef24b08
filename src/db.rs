//! Database types and environment handle

use std::path::Path;

use heed::types::{Bytes, SerdeJson, Str, U64};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};

use crate::constants::{DEFAULT_MAP_SIZE, KEY_SEP, MAX_DBS};
use crate::error::{err, Result};
use crate::tx::Tx;
use crate::types::{PermissionCategory, PermissionItem, RoleRecord, UserRecord};

// Database type aliases
pub type Db = Database<Bytes, U64<byteorder::BigEndian>>;
pub type Table<T> = Database<Str, SerdeJson<T>>;

/// Create a composite key `a \0 b`
#[inline]
pub fn key(a: &str, b: &str) -> Vec<u8> {
    let mut k = Vec::with_capacity(a.len() + b.len() + 1);
    k.extend_from_slice(a.as_bytes());
    k.push(KEY_SEP);
    k.extend_from_slice(b.as_bytes());
    k
}

#[inline]
fn prefix(a: &str) -> Vec<u8> {
    let mut p = Vec::with_capacity(a.len() + 1);
    p.extend_from_slice(a.as_bytes());
    p.push(KEY_SEP);
    p
}

/// Second half of a composite key
fn suffix(k: &[u8], pfx_len: usize) -> Result<String> {
    String::from_utf8(k[pfx_len..].to_vec()).map_err(err)
}

/// Bidirectional index: fwd[a,b] and rev[b,a] stay in sync
#[derive(Clone, Copy)]
pub struct BiPair {
    pub fwd: Db,
    pub rev: Db,
}

impl BiPair {
    #[inline]
    pub fn get(&self, tx: &RoTxn, a: &str, b: &str) -> Result<Option<u64>> {
        self.fwd.get(tx, &key(a, b)).map_err(err)
    }

    #[inline]
    pub fn put(&self, tx: &mut RwTxn, a: &str, b: &str, v: u64) -> Result<()> {
        self.fwd.put(tx, &key(a, b), &v).map_err(err)?;
        self.rev.put(tx, &key(b, a), &v).map_err(err)
    }

    #[inline]
    pub fn del(&self, tx: &mut RwTxn, a: &str, b: &str) -> Result<bool> {
        let r = self.fwd.delete(tx, &key(a, b)).map_err(err)?;
        self.rev.delete(tx, &key(b, a)).map_err(err)?;
        Ok(r)
    }

    pub fn list_fwd(&self, tx: &RoTxn, a: &str) -> Result<Vec<(String, u64)>> {
        Self::list_pfx(tx, &self.fwd, a)
    }

    pub fn list_rev(&self, tx: &RoTxn, b: &str) -> Result<Vec<(String, u64)>> {
        Self::list_pfx(tx, &self.rev, b)
    }

    /// Remove every row whose first half is `a`
    pub fn clear_fwd(&self, tx: &mut RwTxn, a: &str) -> Result<usize> {
        let rows = self.list_fwd(tx, a)?;
        for (b, _) in &rows {
            self.del(tx, a, b)?;
        }
        Ok(rows.len())
    }

    /// Remove every row whose second half is `b`
    pub fn clear_rev(&self, tx: &mut RwTxn, b: &str) -> Result<usize> {
        let rows = self.list_rev(tx, b)?;
        for (a, _) in &rows {
            self.del(tx, a, b)?;
        }
        Ok(rows.len())
    }

    fn list_pfx(tx: &RoTxn, db: &Db, a: &str) -> Result<Vec<(String, u64)>> {
        let pfx = prefix(a);
        let mut r = Vec::new();
        for item in db.prefix_iter(tx, &pfx).map_err(err)? {
            let (k, v) = item.map_err(err)?;
            r.push((suffix(k, pfx.len())?, v));
        }
        Ok(r)
    }
}

/// All database handles
#[derive(Clone, Copy)]
pub struct Dbs {
    pub categories: Table<PermissionCategory>,
    pub items: Table<PermissionItem>,
    pub roles: Table<RoleRecord>,
    pub users: Table<UserRecord>,
    pub role_grants: BiPair,
    pub user_overrides: BiPair,
}

/// Handle to an open grant store. Cheap to clone; every clone shares one LMDB environment.
#[derive(Clone)]
pub struct Store {
    env: Env,
    dbs: Dbs,
}

impl Store {
    /// Open (creating if needed) the store at `path` with the default map size
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_map_size(path, DEFAULT_MAP_SIZE)
    }

    pub fn open_with_map_size(path: impl AsRef<Path>, map_size: usize) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(err)?;
        // SAFETY: LMDB requires no other processes access this path concurrently during open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)
                .map_err(err)?
        };
        let mut tx = env.write_txn().map_err(err)?;
        let dbs = Dbs {
            categories: env.create_database(&mut tx, Some("categories")).map_err(err)?,
            items: env.create_database(&mut tx, Some("items")).map_err(err)?,
            roles: env.create_database(&mut tx, Some("roles")).map_err(err)?,
            users: env.create_database(&mut tx, Some("users")).map_err(err)?,
            role_grants: BiPair {
                fwd: env.create_database(&mut tx, Some("role_grants")).map_err(err)?,
                rev: env.create_database(&mut tx, Some("role_grants_rev")).map_err(err)?,
            },
            user_overrides: BiPair {
                fwd: env.create_database(&mut tx, Some("user_overrides")).map_err(err)?,
                rev: env.create_database(&mut tx, Some("user_overrides_rev")).map_err(err)?,
            },
        };
        tx.commit().map_err(err)?;
        tracing::debug!(path = %path.display(), map_size, "grant store opened");
        Ok(Store { env, dbs })
    }

    /// Execute a read-only operation against one consistent snapshot
    #[inline]
    pub(crate) fn read<T, F: FnOnce(&Dbs, &RoTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        let tx = self.env.read_txn().map_err(err)?;
        f(&self.dbs, &tx)
    }

    /// Run multiple operations in a single write transaction.
    /// Nothing is committed unless `f` returns `Ok`.
    pub fn transact<T, F: FnOnce(&mut Tx) -> Result<T>>(&self, f: F) -> Result<T> {
        let mut tx = Tx::new(self.env.write_txn().map_err(err)?, self.dbs);
        let r = f(&mut tx)?;
        tx.commit()?;
        Ok(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_keys_sort_by_first_half() {
        assert_eq!(key("staff", "a"), b"staff\0a".to_vec());
        // "staff\0..." must sort before "staffer\0..." so prefix scans stay within one target
        assert!(key("staff", "zzz") < key("staffer", "a"));
        assert!(!key("staffer", "a").starts_with(&prefix("staff")));
    }

    #[test]
    fn prefix_scans_stay_within_one_target() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store
            .transact(|tx| {
                let d = tx.dbs();
                d.role_grants.put(tx.tx(), "staff", "a", 1)?;
                d.role_grants.put(tx.tx(), "staff", "b", 3)?;
                d.role_grants.put(tx.tx(), "staffer", "a", 7)
            })
            .unwrap();
        let rows = store.read(|d, tx| d.role_grants.list_fwd(tx, "staff")).unwrap();
        assert_eq!(rows, vec![("a".to_string(), 1), ("b".to_string(), 3)]);
        let rev = store.read(|d, tx| d.role_grants.list_rev(tx, "a")).unwrap();
        assert_eq!(rev, vec![("staff".to_string(), 1), ("staffer".to_string(), 7)]);

        let removed = store.transact(|tx| {
            let d = tx.dbs();
            d.role_grants.clear_rev(tx.tx(), "a")
        }).unwrap();
        assert_eq!(removed, 2);
        let rows = store.read(|d, tx| d.role_grants.list_fwd(tx, "staff")).unwrap();
        assert_eq!(rows, vec![("b".to_string(), 3)]);
    }
}
