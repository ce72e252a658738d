//! Run-scoped resolution of cross-entity references.
//!
//! Machines reference crafting categories by name; recipe ingredients and
//! products reference items by (type, name). The resolver collects the
//! distinct references of a chunk, resolves them against the store in one
//! batched lookup per kind, and caches the results for the rest of the run.
//! It is created per import run and discarded with it; nothing here is
//! process-wide state.

use crate::entity::ItemType;
use crate::error::{Error, Result};
use crate::store::{CategoryLookup, ItemLookup};
use crate::EntityId;
use std::collections::HashMap;

/// Caches resolved reference identities for one import run.
#[derive(Debug, Default)]
pub struct ReferenceResolver {
    categories: HashMap<String, EntityId>,
    items: HashMap<(ItemType, String), EntityId>,
}

impl ReferenceResolver {
    /// Create an empty resolver for a new run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve crafting category names in one batched lookup, skipping names
    /// already cached. Names the store does not know stay unresolved; the
    /// error surfaces on [`ReferenceResolver::category_id`].
    pub fn resolve_categories<I>(&mut self, names: I, lookup: &dyn CategoryLookup) -> Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        let mut wanted: Vec<String> = names
            .into_iter()
            .filter(|name| !self.categories.contains_key(name))
            .collect();
        wanted.sort_unstable();
        wanted.dedup();
        if wanted.is_empty() {
            return Ok(());
        }

        for category in lookup.categories_by_names(&wanted)? {
            self.categories.insert(category.name, category.id);
        }
        Ok(())
    }

    /// Resolve item (type, name) pairs in one batched lookup, skipping pairs
    /// already cached.
    pub fn resolve_items<I>(&mut self, names: I, lookup: &dyn ItemLookup) -> Result<()>
    where
        I: IntoIterator<Item = (ItemType, String)>,
    {
        let mut wanted: Vec<(ItemType, String)> = names
            .into_iter()
            .filter(|key| !self.items.contains_key(key))
            .collect();
        wanted.sort_unstable();
        wanted.dedup();
        if wanted.is_empty() {
            return Ok(());
        }

        for item in lookup.items_by_names(&wanted)? {
            self.items.insert((item.item_type, item.name), item.id);
        }
        Ok(())
    }

    /// The identity of a resolved crafting category.
    pub fn category_id(&self, name: &str) -> Result<EntityId> {
        self.categories
            .get(name)
            .copied()
            .ok_or_else(|| Error::MissingCraftingCategory(name.to_string()))
    }

    /// The identity of a resolved item.
    pub fn item_id(&self, item_type: ItemType, name: &str) -> Result<EntityId> {
        self.items
            .get(&(item_type, name.to_string()))
            .copied()
            .ok_or_else(|| Error::MissingItem {
                item_type,
                name: name.to_string(),
            })
    }
}
