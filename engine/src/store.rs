//! Store seam and the in-memory reference store.
//!
//! The engine treats the persistent store as a key-value-by-identity surface
//! with batch lookup, staged writes with a single flush commit point, and
//! orphan garbage collection. [`DataStore`] is the in-memory implementation
//! used by tests and by callers that persist snapshots themselves; a real
//! database adapter implements the same traits.

use crate::combination::Combination;
use crate::entity::{
    CraftingCategory, Entity, EntityKind, IconImage, Item, ItemType, Machine, Mod, Recipe,
    Translation,
};
use crate::error::Result;
use crate::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// Batched, identity-keyed access to one entity kind.
///
/// `persist` stages a row; nothing is visible to lookups until `flush`
/// commits the staged rows in one batch. Whether that batch is atomic is the
/// implementation's concern; [`DataStore`] commits it atomically.
pub trait KindStore<E: Entity> {
    /// Batched lookup. Returns the entities whose ids were found, in the
    /// order the ids were given; missing ids are skipped silently.
    fn find_by_ids(&self, ids: &[EntityId]) -> Result<Vec<E>>;

    /// Stage a row for the next flush. An existing row with the same id is
    /// replaced on commit.
    fn persist(&mut self, entity: E) -> Result<()>;

    /// Commit all staged rows.
    fn flush(&mut self) -> Result<()>;

    /// Delete every row of this kind not referenced by any combination.
    /// Returns the number of rows removed.
    fn remove_orphans(&mut self) -> Result<usize>;
}

/// Batched name lookup for crafting categories.
pub trait CategoryLookup {
    fn categories_by_names(&self, names: &[String]) -> Result<Vec<CraftingCategory>>;
}

/// Batched (type, name) lookup for items.
pub trait ItemLookup {
    fn items_by_names(&self, names: &[(ItemType, String)]) -> Result<Vec<Item>>;
}

/// The lookup services the reference pre-pass needs.
pub trait ReferenceLookup: CategoryLookup + ItemLookup {}

impl<T: CategoryLookup + ItemLookup> ReferenceLookup for T {}

/// One kind's rows plus its staging area and write counters.
///
/// Uses BTreeMap for deterministic serialization order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(serialize = "E: Serialize", deserialize = "E: serde::de::DeserializeOwned"))]
struct Table<E> {
    rows: BTreeMap<EntityId, E>,
    #[serde(skip)]
    staged: Vec<E>,
    inserted: u64,
    updated: u64,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            staged: Vec::new(),
            inserted: 0,
            updated: 0,
        }
    }
}

impl<E: Entity> Table<E> {
    fn find_by_ids(&self, ids: &[EntityId]) -> Vec<E> {
        let mut seen = HashSet::new();
        ids.iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| self.rows.get(id).cloned())
            .collect()
    }

    fn flush(&mut self) {
        for entity in self.staged.drain(..) {
            if self.rows.insert(entity.id(), entity).is_some() {
                self.updated += 1;
            } else {
                self.inserted += 1;
            }
        }
    }

    fn remove_orphans(&mut self, referenced: &HashSet<EntityId>) -> usize {
        let before = self.rows.len();
        self.rows.retain(|id, _| referenced.contains(id));
        before - self.rows.len()
    }
}

/// In-memory store holding all entity kinds and combinations.
///
/// Serializable as a snapshot; the staging areas are transient and excluded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStore {
    mods: Table<Mod>,
    crafting_categories: Table<CraftingCategory>,
    items: Table<Item>,
    machines: Table<Machine>,
    recipes: Table<Recipe>,
    icon_images: Table<IconImage>,
    translations: Table<Translation>,
    combinations: BTreeMap<Uuid, Combination>,
}

impl DataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a combination, replacing any previous state under the same id.
    pub fn save_combination(&mut self, combination: Combination) {
        self.combinations.insert(combination.id, combination);
    }

    /// Look up a combination by id.
    pub fn combination(&self, id: &Uuid) -> Option<&Combination> {
        self.combinations.get(id)
    }

    /// Delete a combination. Its entities become orphans unless another
    /// combination still references them.
    pub fn remove_combination(&mut self, id: &Uuid) -> Option<Combination> {
        self.combinations.remove(id)
    }

    /// The identities of one kind referenced by any combination.
    pub fn referenced_ids(&self, kind: EntityKind) -> HashSet<EntityId> {
        self.combinations
            .values()
            .flat_map(|combination| combination.relations(kind).iter().copied())
            .collect()
    }

    /// Committed row count of one kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Mod => self.mods.rows.len(),
            EntityKind::CraftingCategory => self.crafting_categories.rows.len(),
            EntityKind::Item => self.items.rows.len(),
            EntityKind::Machine => self.machines.rows.len(),
            EntityKind::Recipe => self.recipes.rows.len(),
            EntityKind::IconImage => self.icon_images.rows.len(),
            EntityKind::Translation => self.translations.rows.len(),
        }
    }

    /// Total committed inserts for one kind since the store was created.
    pub fn inserted(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Mod => self.mods.inserted,
            EntityKind::CraftingCategory => self.crafting_categories.inserted,
            EntityKind::Item => self.items.inserted,
            EntityKind::Machine => self.machines.inserted,
            EntityKind::Recipe => self.recipes.inserted,
            EntityKind::IconImage => self.icon_images.inserted,
            EntityKind::Translation => self.translations.inserted,
        }
    }

    /// Total committed in-place updates for one kind.
    pub fn updated(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Mod => self.mods.updated,
            EntityKind::CraftingCategory => self.crafting_categories.updated,
            EntityKind::Item => self.items.updated,
            EntityKind::Machine => self.machines.updated,
            EntityKind::Recipe => self.recipes.updated,
            EntityKind::IconImage => self.icon_images.updated,
            EntityKind::Translation => self.translations.updated,
        }
    }

    /// Fetch a single row by id, mostly for tests and inspection.
    pub fn get<E: Entity>(&self, id: &EntityId) -> Option<E>
    where
        Self: KindStore<E>,
    {
        self.find_by_ids(std::slice::from_ref(id))
            .ok()
            .and_then(|mut found| found.pop())
    }
}

macro_rules! impl_kind_store {
    ($field:ident, $entity:ty) => {
        impl KindStore<$entity> for DataStore {
            fn find_by_ids(&self, ids: &[EntityId]) -> Result<Vec<$entity>> {
                Ok(self.$field.find_by_ids(ids))
            }

            fn persist(&mut self, entity: $entity) -> Result<()> {
                self.$field.staged.push(entity);
                Ok(())
            }

            fn flush(&mut self) -> Result<()> {
                self.$field.flush();
                Ok(())
            }

            fn remove_orphans(&mut self) -> Result<usize> {
                let referenced = self.referenced_ids(<$entity as Entity>::KIND);
                Ok(self.$field.remove_orphans(&referenced))
            }
        }
    };
}

impl_kind_store!(mods, Mod);
impl_kind_store!(crafting_categories, CraftingCategory);
impl_kind_store!(items, Item);
impl_kind_store!(machines, Machine);
impl_kind_store!(recipes, Recipe);
impl_kind_store!(icon_images, IconImage);
impl_kind_store!(translations, Translation);

impl CategoryLookup for DataStore {
    fn categories_by_names(&self, names: &[String]) -> Result<Vec<CraftingCategory>> {
        Ok(self
            .crafting_categories
            .rows
            .values()
            .filter(|category| names.iter().any(|name| *name == category.name))
            .cloned()
            .collect())
    }
}

impl ItemLookup for DataStore {
    fn items_by_names(&self, names: &[(ItemType, String)]) -> Result<Vec<Item>> {
        Ok(self
            .items
            .rows
            .values()
            .filter(|item| {
                names
                    .iter()
                    .any(|(item_type, name)| *item_type == item.item_type && *name == item.name)
            })
            .cloned()
            .collect())
    }
}
