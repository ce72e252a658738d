//! Persisted entity types.
//!
//! Every entity carries a content-addressed [`EntityId`] derived from its
//! semantic fields (see [`crate::identity`]). Non-identity payload fields
//! (icon bytes, mod author) may be copied onto an existing record with the
//! same identity; identity-determining fields are by definition unchanged
//! when that happens.

use crate::identity::{ContentHash, IdHasher};
use crate::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The entity kinds the reconciler knows about.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Mod,
    CraftingCategory,
    Item,
    Machine,
    Recipe,
    IconImage,
    Translation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mod => write!(f, "mod"),
            Self::CraftingCategory => write!(f, "crafting category"),
            Self::Item => write!(f, "item"),
            Self::Machine => write!(f, "machine"),
            Self::Recipe => write!(f, "recipe"),
            Self::IconImage => write!(f, "icon image"),
            Self::Translation => write!(f, "translation"),
        }
    }
}

/// Whether an item is a solid item or a fluid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Item,
    Fluid,
}

impl ItemType {
    /// Canonical name used in identity tuples and translation keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Fluid => "fluid",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipe difficulty mode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RecipeMode {
    #[default]
    Normal,
    Expensive,
}

impl RecipeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Expensive => "expensive",
        }
    }
}

impl fmt::Display for RecipeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of a machine's energy usage value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum EnergyUsageUnit {
    #[default]
    W,
    #[serde(rename = "kW")]
    KW,
    MW,
    GW,
    TW,
}

impl EnergyUsageUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::W => "W",
            Self::KW => "kW",
            Self::MW => "MW",
            Self::GW => "GW",
            Self::TW => "TW",
        }
    }
}

impl fmt::Display for EnergyUsageUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted entity with a content-addressed identity.
///
/// Entities are built with a nil id; the reconciler assigns the calculated
/// identity after validation has clamped the fields, so the identity always
/// reflects the values that are actually stored.
pub trait Entity: ContentHash + Clone {
    /// The kind this entity belongs to.
    const KIND: EntityKind;

    /// The assigned identity (nil until assigned).
    fn id(&self) -> EntityId;

    /// Assign an identity.
    fn set_id(&mut self, id: EntityId);
}

/// A game mod, identified by name and version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mod {
    pub id: EntityId,
    pub name: String,
    pub version: String,
    /// Non-identity payload; refreshed on reuse.
    pub author: String,
}

impl Mod {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: EntityId::nil(),
            name: name.into(),
            version: version.into(),
            author: String::new(),
        }
    }
}

impl ContentHash for Mod {
    fn hash_content(&self, hasher: &mut IdHasher) {
        hasher.text(&self.name).text(&self.version);
    }
}

impl Entity for Mod {
    const KIND: EntityKind = EntityKind::Mod;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// A crafting category, identified by its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CraftingCategory {
    pub id: EntityId,
    pub name: String,
}

impl CraftingCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::nil(),
            name: name.into(),
        }
    }
}

impl ContentHash for CraftingCategory {
    fn hash_content(&self, hasher: &mut IdHasher) {
        hasher.text(&self.name);
    }
}

impl Entity for CraftingCategory {
    const KIND: EntityKind = EntityKind::CraftingCategory;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// An item or fluid, identified by type and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: EntityId,
    pub item_type: ItemType,
    pub name: String,
}

impl Item {
    pub fn new(item_type: ItemType, name: impl Into<String>) -> Self {
        Self {
            id: EntityId::nil(),
            item_type,
            name: name.into(),
        }
    }
}

impl ContentHash for Item {
    fn hash_content(&self, hasher: &mut IdHasher) {
        hasher.text(self.item_type.as_str()).text(&self.name);
    }
}

impl Entity for Item {
    const KIND: EntityKind = EntityKind::Item;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// A crafting machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: EntityId,
    pub name: String,
    /// Identities of supported crafting categories. Order-insensitive;
    /// stored sorted and hashed as a set.
    pub crafting_categories: Vec<EntityId>,
    pub crafting_speed: f64,
    pub item_slots: u32,
    pub fluid_input_slots: u32,
    pub fluid_output_slots: u32,
    pub module_slots: u32,
    pub energy_usage: f64,
    pub energy_usage_unit: EnergyUsageUnit,
}

impl ContentHash for Machine {
    fn hash_content(&self, hasher: &mut IdHasher) {
        hasher
            .text(&self.name)
            .sorted_ids(&self.crafting_categories)
            .number(self.crafting_speed)
            .count(self.item_slots)
            .count(self.fluid_input_slots)
            .count(self.fluid_output_slots)
            .count(self.module_slots)
            .number(self.energy_usage)
            .text(self.energy_usage_unit.as_str());
    }
}

impl Entity for Machine {
    const KIND: EntityKind = EntityKind::Machine;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// One ingredient of a recipe, with its explicit position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub item: EntityId,
    pub amount: f64,
    /// Position within the recipe's ingredient list, starting at 0.
    pub order: u32,
}

/// One product of a recipe, with its explicit position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeProduct {
    pub item: EntityId,
    pub amount_min: f64,
    pub amount_max: f64,
    pub probability: f64,
    /// Position within the recipe's product list, starting at 0.
    pub order: u32,
}

/// A crafting recipe. Ingredient and product order is semantically
/// significant and preserved end-to-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: EntityId,
    pub name: String,
    pub mode: RecipeMode,
    pub crafting_time: f64,
    pub crafting_category: EntityId,
    pub ingredients: Vec<RecipeIngredient>,
    pub products: Vec<RecipeProduct>,
}

impl ContentHash for Recipe {
    fn hash_content(&self, hasher: &mut IdHasher) {
        hasher
            .text(&self.name)
            .text(self.mode.as_str())
            .number(self.crafting_time)
            .id(&self.crafting_category);
        for ingredient in &self.ingredients {
            hasher
                .id(&ingredient.item)
                .number(ingredient.amount)
                .count(ingredient.order);
        }
        for product in &self.products {
            hasher
                .id(&product.item)
                .number(product.amount_min)
                .number(product.amount_max)
                .number(product.probability)
                .count(product.order);
        }
    }
}

impl Entity for Recipe {
    const KIND: EntityKind = EntityKind::Recipe;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// A rendered icon image.
///
/// Identity is the export-provided image hash; the actual bytes and the
/// pixel size are non-identity payload copied onto an existing record on
/// reuse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconImage {
    pub id: EntityId,
    pub image_hash: String,
    pub size: u32,
    pub data: Vec<u8>,
}

impl IconImage {
    pub fn new(image_hash: impl Into<String>) -> Self {
        Self {
            id: EntityId::nil(),
            image_hash: image_hash.into(),
            size: 0,
            data: Vec::new(),
        }
    }
}

impl ContentHash for IconImage {
    fn hash_content(&self, hasher: &mut IdHasher) {
        hasher.text(&self.image_hash);
    }
}

impl Entity for IconImage {
    const KIND: EntityKind = EntityKind::IconImage;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// Category of the entity a translation belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TranslationType {
    Mod,
    Item,
    Fluid,
    Machine,
    Recipe,
}

impl TranslationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mod => "mod",
            Self::Item => "item",
            Self::Fluid => "fluid",
            Self::Machine => "machine",
            Self::Recipe => "recipe",
        }
    }
}

impl fmt::Display for TranslationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ItemType> for TranslationType {
    fn from(value: ItemType) -> Self {
        match value {
            ItemType::Item => Self::Item,
            ItemType::Fluid => Self::Fluid,
        }
    }
}

/// A localized label/description pair for one entity name.
///
/// At most one instance exists per (locale, type, name) within one
/// aggregation run. The duplicate flags mark translations that are redundant
/// with a more generic item or fluid translation of the same name; flagged
/// translations are kept, not removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub id: EntityId,
    pub locale: String,
    pub translation_type: TranslationType,
    pub name: String,
    pub value: String,
    pub description: String,
    pub is_duplicated_by_machine: bool,
    pub is_duplicated_by_recipe: bool,
}

impl Translation {
    pub fn new(
        locale: impl Into<String>,
        translation_type: TranslationType,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::nil(),
            locale: locale.into(),
            translation_type,
            name: name.into(),
            value: String::new(),
            description: String::new(),
            is_duplicated_by_machine: false,
            is_duplicated_by_recipe: false,
        }
    }
}

impl ContentHash for Translation {
    fn hash_content(&self, hasher: &mut IdHasher) {
        hasher
            .text(&self.locale)
            .text(self.translation_type.as_str())
            .text(&self.name)
            .text(&self.value)
            .text(&self.description)
            .flag(self.is_duplicated_by_machine)
            .flag(self.is_duplicated_by_recipe);
    }
}

impl Entity for Translation {
    const KIND: EntityKind = EntityKind::Translation;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_identity_covers_type_and_name() {
        let item = Item::new(ItemType::Item, "iron-plate");
        let fluid = Item::new(ItemType::Fluid, "iron-plate");
        assert_ne!(item.calculate_id(), fluid.calculate_id());
        assert_eq!(
            item.calculate_id(),
            Item::new(ItemType::Item, "iron-plate").calculate_id()
        );
    }

    #[test]
    fn machine_category_order_is_insignificant() {
        let a = EntityId::from_bytes([1; 16]);
        let b = EntityId::from_bytes([2; 16]);

        let machine = |categories: Vec<EntityId>| Machine {
            id: EntityId::nil(),
            name: "assembler".into(),
            crafting_categories: categories,
            crafting_speed: 1.25,
            item_slots: 2,
            fluid_input_slots: 0,
            fluid_output_slots: 0,
            module_slots: 4,
            energy_usage: 150.0,
            energy_usage_unit: EnergyUsageUnit::KW,
        };

        assert_eq!(
            machine(vec![a, b]).calculate_id(),
            machine(vec![b, a]).calculate_id()
        );
    }

    #[test]
    fn recipe_ingredient_order_is_significant() {
        let iron = EntityId::from_bytes([1; 16]);
        let coal = EntityId::from_bytes([2; 16]);

        let recipe = |items: Vec<EntityId>| Recipe {
            id: EntityId::nil(),
            name: "steel".into(),
            mode: RecipeMode::Normal,
            crafting_time: 16.0,
            crafting_category: EntityId::from_bytes([9; 16]),
            ingredients: items
                .into_iter()
                .enumerate()
                .map(|(order, item)| RecipeIngredient {
                    item,
                    amount: 1.0,
                    order: order as u32,
                })
                .collect(),
            products: Vec::new(),
        };

        assert_ne!(
            recipe(vec![iron, coal]).calculate_id(),
            recipe(vec![coal, iron]).calculate_id()
        );
    }

    #[test]
    fn icon_bytes_are_not_identity() {
        let mut a = IconImage::new("abcd1234");
        a.size = 64;
        a.data = vec![1, 2, 3];

        let mut b = IconImage::new("abcd1234");
        b.size = 32;
        b.data = vec![9, 9];

        assert_eq!(a.calculate_id(), b.calculate_id());
    }

    #[test]
    fn mod_author_is_not_identity() {
        let mut a = Mod::new("base", "1.1.0");
        a.author = "wube".into();
        let b = Mod::new("base", "1.1.0");
        assert_eq!(a.calculate_id(), b.calculate_id());

        let c = Mod::new("base", "1.1.1");
        assert_ne!(a.calculate_id(), c.calculate_id());
    }

    #[test]
    fn translation_identity_covers_flags() {
        let mut a = Translation::new("en", TranslationType::Recipe, "iron-plate");
        let b = a.clone();
        a.is_duplicated_by_recipe = true;
        assert_ne!(a.calculate_id(), b.calculate_id());
    }

    #[test]
    fn serialization_roundtrip() {
        let mut item = Item::new(ItemType::Fluid, "water");
        item.set_id(item.calculate_id());

        let json = serde_json::to_string(&item).unwrap();
        let parsed: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(item, parsed);
    }
}
