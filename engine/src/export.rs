//! Export data model - the read-only input to an import run.
//!
//! An export snapshot is produced externally (by the game-side export tool)
//! and handed to the engine as ordered entity sequences plus rendered icon
//! bytes. The engine never mutates export entities.

use crate::entity::{EnergyUsageUnit, ItemType, RecipeMode};
use crate::LocaleMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A mod in the export snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMod {
    pub name: String,
    pub version: String,
    pub author: String,
    pub titles: LocaleMap,
    pub descriptions: LocaleMap,
}

/// An item or fluid in the export snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportItem {
    pub item_type: ItemType,
    pub name: String,
    pub labels: LocaleMap,
    pub descriptions: LocaleMap,
}

/// A crafting machine in the export snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMachine {
    pub name: String,
    pub crafting_categories: Vec<String>,
    pub crafting_speed: f64,
    pub item_slots: u32,
    pub fluid_input_slots: u32,
    pub fluid_output_slots: u32,
    pub module_slots: u32,
    pub energy_usage: f64,
    pub energy_usage_unit: EnergyUsageUnit,
    pub labels: LocaleMap,
    pub descriptions: LocaleMap,
}

/// One recipe ingredient, referencing an item by type and name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportIngredient {
    pub item_type: ItemType,
    pub name: String,
    pub amount: f64,
}

/// One recipe product, referencing an item by type and name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProduct {
    pub item_type: ItemType,
    pub name: String,
    pub amount_min: f64,
    pub amount_max: f64,
    pub probability: f64,
}

/// A recipe in the export snapshot. Ingredient and product order is the
/// order the game reports and must be preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecipe {
    pub name: String,
    pub mode: RecipeMode,
    pub crafting_time: f64,
    pub crafting_category: String,
    pub ingredients: Vec<ExportIngredient>,
    pub products: Vec<ExportProduct>,
    pub labels: LocaleMap,
    pub descriptions: LocaleMap,
}

/// An icon reference in the export snapshot. The image hash is computed by
/// the export tool over the rendered image contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportIcon {
    pub image_hash: String,
    pub size: u32,
}

/// Read-only accessor over one export snapshot.
///
/// Each sequence is in the export's native order and stable across calls,
/// so disjoint `(offset, limit)` windows taken by parallel import processes
/// partition it exactly.
pub trait ExportSource {
    fn mods(&self) -> &[ExportMod];
    fn crafting_categories(&self) -> &[String];
    fn items(&self) -> &[ExportItem];
    fn machines(&self) -> &[ExportMachine];
    fn recipes(&self) -> &[ExportRecipe];
    fn icons(&self) -> &[ExportIcon];

    /// Rendered image bytes for an icon, looked up by its image hash.
    fn rendered_icon(&self, image_hash: &str) -> Option<&[u8]>;
}

/// In-memory export snapshot, deserializable from an export dump.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub mods: Vec<ExportMod>,
    pub crafting_categories: Vec<String>,
    pub items: Vec<ExportItem>,
    pub machines: Vec<ExportMachine>,
    pub recipes: Vec<ExportRecipe>,
    pub icons: Vec<ExportIcon>,
    pub rendered_icons: BTreeMap<String, Vec<u8>>,
}

impl ExportData {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate `crafting_categories` from the distinct category names
    /// referenced by machines and recipes, in sorted order.
    ///
    /// Convenience for exports that do not ship an explicit category list.
    pub fn collect_crafting_categories(&mut self) {
        let names: BTreeSet<String> = self
            .machines
            .iter()
            .flat_map(|machine| machine.crafting_categories.iter().cloned())
            .chain(self.recipes.iter().map(|r| r.crafting_category.clone()))
            .collect();
        self.crafting_categories = names.into_iter().collect();
    }
}

impl ExportSource for ExportData {
    fn mods(&self) -> &[ExportMod] {
        &self.mods
    }

    fn crafting_categories(&self) -> &[String] {
        &self.crafting_categories
    }

    fn items(&self) -> &[ExportItem] {
        &self.items
    }

    fn machines(&self) -> &[ExportMachine] {
        &self.machines
    }

    fn recipes(&self) -> &[ExportRecipe] {
        &self.recipes
    }

    fn icons(&self) -> &[ExportIcon] {
        &self.icons
    }

    fn rendered_icon(&self, image_hash: &str) -> Option<&[u8]> {
        self.rendered_icons.get(image_hash).map(Vec::as_slice)
    }
}
