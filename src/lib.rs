//! grantmatrix - permission matrix engine on LMDB
//!
//! Decides, for an actor (a role plus a user id) and a protected permission
//! item, which of view / edit / delete are allowed, and lets an administrator
//! read and bulk-replace the grants of one role or one user.
//!
//! - **Catalog**: permission categories and items, provisioned from config
//! - **Grant store**: per-role grants and per-user overrides, replaced per target atomically
//! - **Resolver**: active override > role grant > default deny
//! - **Matrix service**: editing view of one target and validated bulk save
//!
//! ```ignore
//! use grantmatrix::{
//!     Mode, PermissionCategory, PermissionEntry, PermissionItem, Permissions, RoleRecord, Seed,
//!     Store, UserRecord,
//! };
//!
//! let store = Store::open("./data/grants.mdb")?;
//! store.provision(&Seed {
//!     categories: vec![PermissionCategory {
//!         id: "clients".into(),
//!         display_name: "Clients".into(),
//!         description: None,
//!     }],
//!     items: vec![PermissionItem {
//!         id: "clients.delete".into(),
//!         category_id: "clients".into(),
//!         display_name: "Delete clients".into(),
//!         description: None,
//!     }],
//!     roles: vec![RoleRecord { id: "staff".into(), display_name: "Staff".into() }],
//!     users: vec![UserRecord {
//!         id: "u1".into(),
//!         display_name: "U1".into(),
//!         role: "staff".into(),
//!     }],
//! })?;
//!
//! store.save_matrix(
//!     &Mode::Role("staff".into()),
//!     &[PermissionEntry::new("clients.delete", Permissions::new(true, true, false), None)],
//! )?;
//! let p = store.effective(&store.actor_for("u1")?, "clients.delete")?;
//! assert!(p.can_edit && !p.can_delete);
//! ```

pub mod catalog;
pub mod config;
pub mod constants;
pub mod db;
pub mod directory;
pub mod error;
pub mod grants;
pub mod matrix;
pub mod resolver;
pub mod tx;
pub mod types;

#[cfg(feature = "server")]
pub mod server;

pub use config::{Config, Loader, Seed};
pub use db::Store;
pub use error::{Error, Result};
pub use resolver::resolve;
pub use tx::Tx;
pub use types::{
    Action, Actor, Matrix, MatrixRow, Mode, PermissionCategory, PermissionEntry, PermissionItem,
    Permissions, RoleGrant, RoleRecord, UserOverride, UserRecord,
};
