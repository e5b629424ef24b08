//! Catalog, directory and grant records

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{DELETE, EDIT, KEY_SEP, MAX_ID_LEN, OVERRIDE_ROLE, VIEW};
use crate::error::{invalid, Result};

/// Presentation grouping of permission items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCategory {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Smallest protectable unit (an action/resource pair)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionItem {
    pub id: String,
    pub category_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub display_name: String,
    pub role: String,
}

/// The view/edit/delete triple
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permissions {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Permissions {
    pub const DENY: Permissions = Permissions {
        can_view: false,
        can_edit: false,
        can_delete: false,
    };

    pub fn new(can_view: bool, can_edit: bool, can_delete: bool) -> Self {
        Self { can_view, can_edit, can_delete }
    }

    #[inline]
    pub fn from_mask(mask: u64) -> Self {
        Self {
            can_view: mask & VIEW != 0,
            can_edit: mask & EDIT != 0,
            can_delete: mask & DELETE != 0,
        }
    }

    #[inline]
    pub fn mask(&self) -> u64 {
        let mut m = 0;
        if self.can_view {
            m |= VIEW;
        }
        if self.can_edit {
            m |= EDIT;
        }
        if self.can_delete {
            m |= DELETE;
        }
        m
    }

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.can_view,
            Action::Edit => self.can_edit,
            Action::Delete => self.can_delete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Edit,
    Delete,
}

/// Default permission triple for every holder of `role`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    pub role: String,
    pub permission_item_id: String,
    #[serde(flatten)]
    pub permissions: Permissions,
}

impl RoleGrant {
    pub fn new(role: impl Into<String>, item: impl Into<String>, permissions: Permissions) -> Self {
        Self { role: role.into(), permission_item_id: item.into(), permissions }
    }
}

/// User-specific triple; governs only when `override_role` is set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOverride {
    pub user_id: String,
    pub permission_item_id: String,
    #[serde(flatten)]
    pub permissions: Permissions,
    pub override_role: bool,
}

impl UserOverride {
    pub fn new(
        user_id: impl Into<String>,
        item: impl Into<String>,
        permissions: Permissions,
        override_role: bool,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            permission_item_id: item.into(),
            permissions,
            override_role,
        }
    }

    pub(crate) fn from_mask(user_id: &str, item: String, mask: u64) -> Self {
        Self {
            user_id: user_id.to_string(),
            permission_item_id: item,
            permissions: Permissions::from_mask(mask),
            override_role: mask & OVERRIDE_ROLE != 0,
        }
    }

    pub(crate) fn mask(&self) -> u64 {
        self.permissions.mask() | if self.override_role { OVERRIDE_ROLE } else { 0 }
    }
}

/// The identity making a request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub role: String,
    pub user_id: String,
}

impl Actor {
    pub fn new(role: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self { role: role.into(), user_id: user_id.into() }
    }
}

/// Which grant table a matrix read or save targets
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mode {
    Role(String),
    User(String),
}

impl Mode {
    /// Build from the `{mode}/{targetId}` pair of a request path
    pub fn parse(kind: &str, target: &str) -> Result<Self> {
        validate_id(kind, target)?;
        match kind {
            "role" => Ok(Mode::Role(target.to_string())),
            "user" => Ok(Mode::User(target.to_string())),
            other => Err(invalid(format!("unknown mode '{}' (expected 'role' or 'user')", other))),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Mode::Role(_) => "role",
            Mode::User(_) => "user",
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Mode::Role(id) | Mode::User(id) => id,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.target())
    }
}

/// One submitted row of a matrix save
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionEntry {
    #[serde(rename = "permission_id", alias = "permission_item_id")]
    pub permission_item_id: String,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_role: Option<bool>,
}

impl PermissionEntry {
    pub fn new(
        item: impl Into<String>,
        permissions: Permissions,
        override_role: Option<bool>,
    ) -> Self {
        Self {
            permission_item_id: item.into(),
            can_view: permissions.can_view,
            can_edit: permissions.can_edit,
            can_delete: permissions.can_delete,
            override_role,
        }
    }

    pub fn permissions(&self) -> Permissions {
        Permissions::new(self.can_view, self.can_edit, self.can_delete)
    }
}

/// One row of `current_permissions`: the raw stored grant for one catalog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRow {
    #[serde(rename = "permission_id")]
    pub permission_item_id: String,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub override_role: bool,
    /// False when no row is persisted for this item (shown as all-false)
    pub stored: bool,
}

impl MatrixRow {
    pub fn permissions(&self) -> Permissions {
        Permissions::new(self.can_view, self.can_edit, self.can_delete)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    pub categories: Vec<PermissionCategory>,
    pub items: Vec<PermissionItem>,
    pub current_permissions: Vec<MatrixRow>,
}

/// Ids become halves of composite LMDB keys
pub fn validate_id(what: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(invalid(format!("{} id is empty", what)));
    }
    if id.len() > MAX_ID_LEN {
        return Err(invalid(format!("{} id exceeds {} bytes", what, MAX_ID_LEN)));
    }
    if id.as_bytes().contains(&KEY_SEP) {
        return Err(invalid(format!("{} id contains a NUL byte", what)));
    }
    Ok(())
}
