//! Per-kind reconciliation strategies.
//!
//! Each strategy supplies the three kind-specific steps the generic
//! [`Reconciler`](crate::Reconciler) needs: slicing the export, resolving
//! references, and building the target entity. Machines and recipes depend
//! on crafting category and item identities already being persisted, so the
//! pipeline reconciles those kinds to completion first.

use crate::entity::{
    CraftingCategory, IconImage, Item, Machine, Mod, Recipe, RecipeIngredient, RecipeProduct,
};
use crate::error::{Error, Result};
use crate::export::{
    ExportIcon, ExportItem, ExportMachine, ExportMod, ExportRecipe, ExportSource,
};
use crate::reconcile::EntityStrategy;
use crate::resolve::ReferenceResolver;
use crate::store::ReferenceLookup;
use crate::EntityId;

/// Strategy for mods. The author is non-identity payload and is refreshed
/// on reuse.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModStrategy;

impl EntityStrategy for ModStrategy {
    type Export = ExportMod;
    type Entity = Mod;

    fn export_entities<'a>(&self, source: &'a dyn ExportSource) -> &'a [ExportMod] {
        source.mods()
    }

    fn build(
        &self,
        export: &ExportMod,
        _source: &dyn ExportSource,
        _resolver: &ReferenceResolver,
    ) -> Result<Mod> {
        let mut entity = Mod::new(&export.name, &export.version);
        entity.author = export.author.clone();
        Ok(entity)
    }

    fn copy_payload(&self, fresh: &Mod, stored: &mut Mod) -> bool {
        if stored.author != fresh.author {
            stored.author = fresh.author.clone();
            return true;
        }
        false
    }
}

/// Strategy for crafting categories.
#[derive(Debug, Clone, Copy, Default)]
pub struct CraftingCategoryStrategy;

impl EntityStrategy for CraftingCategoryStrategy {
    type Export = String;
    type Entity = CraftingCategory;

    fn export_entities<'a>(&self, source: &'a dyn ExportSource) -> &'a [String] {
        source.crafting_categories()
    }

    fn build(
        &self,
        export: &String,
        _source: &dyn ExportSource,
        _resolver: &ReferenceResolver,
    ) -> Result<CraftingCategory> {
        Ok(CraftingCategory::new(export.clone()))
    }
}

/// Strategy for items and fluids.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemStrategy;

impl EntityStrategy for ItemStrategy {
    type Export = ExportItem;
    type Entity = Item;

    fn export_entities<'a>(&self, source: &'a dyn ExportSource) -> &'a [ExportItem] {
        source.items()
    }

    fn build(
        &self,
        export: &ExportItem,
        _source: &dyn ExportSource,
        _resolver: &ReferenceResolver,
    ) -> Result<Item> {
        Ok(Item::new(export.item_type, &export.name))
    }
}

/// Strategy for machines. Requires crafting categories to be persisted
/// before its chunks run.
#[derive(Debug, Clone, Copy, Default)]
pub struct MachineStrategy;

impl EntityStrategy for MachineStrategy {
    type Export = ExportMachine;
    type Entity = Machine;

    fn export_entities<'a>(&self, source: &'a dyn ExportSource) -> &'a [ExportMachine] {
        source.machines()
    }

    fn prepare(
        &self,
        exports: &[ExportMachine],
        resolver: &mut ReferenceResolver,
        lookup: &dyn ReferenceLookup,
    ) -> Result<()> {
        let names = exports
            .iter()
            .flat_map(|machine| machine.crafting_categories.iter().cloned());
        resolver.resolve_categories(names, lookup)
    }

    fn build(
        &self,
        export: &ExportMachine,
        _source: &dyn ExportSource,
        resolver: &ReferenceResolver,
    ) -> Result<Machine> {
        let mut categories = export
            .crafting_categories
            .iter()
            .map(|name| resolver.category_id(name))
            .collect::<Result<Vec<EntityId>>>()?;
        // Stored sorted; the category set is order-insensitive.
        categories.sort_unstable();
        categories.dedup();

        Ok(Machine {
            id: EntityId::nil(),
            name: export.name.clone(),
            crafting_categories: categories,
            crafting_speed: export.crafting_speed,
            item_slots: export.item_slots,
            fluid_input_slots: export.fluid_input_slots,
            fluid_output_slots: export.fluid_output_slots,
            module_slots: export.module_slots,
            energy_usage: export.energy_usage,
            energy_usage_unit: export.energy_usage_unit,
        })
    }
}

/// Strategy for recipes. Requires crafting categories and items to be
/// persisted before its chunks run; ingredient and product order from the
/// export is recorded as an explicit position field.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeStrategy;

impl EntityStrategy for RecipeStrategy {
    type Export = ExportRecipe;
    type Entity = Recipe;

    fn export_entities<'a>(&self, source: &'a dyn ExportSource) -> &'a [ExportRecipe] {
        source.recipes()
    }

    fn prepare(
        &self,
        exports: &[ExportRecipe],
        resolver: &mut ReferenceResolver,
        lookup: &dyn ReferenceLookup,
    ) -> Result<()> {
        resolver.resolve_categories(
            exports.iter().map(|recipe| recipe.crafting_category.clone()),
            lookup,
        )?;

        let item_refs = exports.iter().flat_map(|recipe| {
            recipe
                .ingredients
                .iter()
                .map(|ingredient| (ingredient.item_type, ingredient.name.clone()))
                .chain(
                    recipe
                        .products
                        .iter()
                        .map(|product| (product.item_type, product.name.clone())),
                )
        });
        resolver.resolve_items(item_refs, lookup)
    }

    fn build(
        &self,
        export: &ExportRecipe,
        _source: &dyn ExportSource,
        resolver: &ReferenceResolver,
    ) -> Result<Recipe> {
        let ingredients = export
            .ingredients
            .iter()
            .enumerate()
            .map(|(order, ingredient)| {
                Ok(RecipeIngredient {
                    item: resolver.item_id(ingredient.item_type, &ingredient.name)?,
                    amount: ingredient.amount,
                    order: order as u32,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let products = export
            .products
            .iter()
            .enumerate()
            .map(|(order, product)| {
                Ok(RecipeProduct {
                    item: resolver.item_id(product.item_type, &product.name)?,
                    amount_min: product.amount_min,
                    amount_max: product.amount_max,
                    probability: product.probability,
                    order: order as u32,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Recipe {
            id: EntityId::nil(),
            name: export.name.clone(),
            mode: export.mode,
            crafting_time: export.crafting_time,
            crafting_category: resolver.category_id(&export.crafting_category)?,
            ingredients,
            products,
        })
    }
}

/// Strategy for icon images. Identity is the export-provided image hash;
/// the rendered bytes and pixel size are payload refreshed on reuse.
#[derive(Debug, Clone, Copy, Default)]
pub struct IconImageStrategy;

impl EntityStrategy for IconImageStrategy {
    type Export = ExportIcon;
    type Entity = IconImage;

    fn export_entities<'a>(&self, source: &'a dyn ExportSource) -> &'a [ExportIcon] {
        source.icons()
    }

    fn build(
        &self,
        export: &ExportIcon,
        source: &dyn ExportSource,
        _resolver: &ReferenceResolver,
    ) -> Result<IconImage> {
        let data = source
            .rendered_icon(&export.image_hash)
            .ok_or_else(|| Error::MissingRenderedIcon(export.image_hash.clone()))?;

        let mut entity = IconImage::new(&export.image_hash);
        entity.size = export.size;
        entity.data = data.to_vec();
        Ok(entity)
    }

    fn copy_payload(&self, fresh: &IconImage, stored: &mut IconImage) -> bool {
        if stored.data != fresh.data || stored.size != fresh.size {
            stored.data = fresh.data.clone();
            stored.size = fresh.size;
            return true;
        }
        false
    }
}
