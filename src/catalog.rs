//! Permission catalog: what can be protected
//!
//! Categories and items are provisioned out-of-band (configuration at start-up)
//! and are read-only to the matrix editor.

use crate::db::Store;
use crate::error::{err, not_found, Result};
use crate::types::{PermissionCategory, PermissionItem};

impl Store {
    /// All categories, ordered by id
    pub fn list_categories(&self) -> Result<Vec<PermissionCategory>> {
        self.read(|d, tx| {
            let mut r = Vec::new();
            for row in d.categories.iter(tx).map_err(err)? {
                r.push(row.map_err(err)?.1);
            }
            Ok(r)
        })
    }

    /// All items, ordered by id
    pub fn list_items(&self) -> Result<Vec<PermissionItem>> {
        self.read(|d, tx| {
            let mut r = Vec::new();
            for row in d.items.iter(tx).map_err(err)? {
                r.push(row.map_err(err)?.1);
            }
            Ok(r)
        })
    }

    /// Items of one category; `NotFound` if the category does not exist
    pub fn items_by_category(&self, category_id: &str) -> Result<Vec<PermissionItem>> {
        self.read(|d, tx| {
            if d.categories.get(tx, category_id).map_err(err)?.is_none() {
                return Err(not_found("category", category_id));
            }
            let mut r = Vec::new();
            for row in d.items.iter(tx).map_err(err)? {
                let (_, item) = row.map_err(err)?;
                if item.category_id == category_id {
                    r.push(item);
                }
            }
            Ok(r)
        })
    }

    pub fn get_category(&self, id: &str) -> Result<PermissionCategory> {
        self.read(|d, tx| {
            d.categories.get(tx, id).map_err(err)?.ok_or_else(|| not_found("category", id))
        })
    }

    pub fn get_item(&self, id: &str) -> Result<PermissionItem> {
        self.read(|d, tx| {
            d.items.get(tx, id).map_err(err)?.ok_or_else(|| not_found("permission item", id))
        })
    }

    pub fn upsert_category(&self, category: &PermissionCategory) -> Result<()> {
        self.transact(|tx| tx.upsert_category(category))
    }

    pub fn upsert_item(&self, item: &PermissionItem) -> Result<()> {
        self.transact(|tx| tx.upsert_item(item))
    }

    /// Remove an item and cascade-delete every role grant and user override referencing it
    pub fn retire_item(&self, id: &str) -> Result<usize> {
        self.transact(|tx| tx.retire_item(id))
    }

    pub fn retire_category(&self, id: &str) -> Result<usize> {
        self.transact(|tx| tx.retire_category(id))
    }
}
