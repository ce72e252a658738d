//! End-to-end tests for moddex-engine
//!
//! These tests run the full import pipeline over realistic export snapshots
//! and check the invariants the engine guarantees: idempotence, entity
//! sharing across combinations, orphan cleanup, and translation flagging.

use moddex_engine::entity::{
    EntityKind, IconImage, Item, ItemType, Machine, Recipe, Translation, TranslationType,
};
use moddex_engine::export::{
    ExportData, ExportIcon, ExportIngredient, ExportItem, ExportMachine, ExportMod, ExportProduct,
    ExportRecipe,
};
use moddex_engine::{DataStore, ImportPipeline, LocaleMap};
use uuid::Uuid;

fn labels(pairs: &[(&str, &str)]) -> LocaleMap {
    pairs
        .iter()
        .map(|(locale, text)| (locale.to_string(), text.to_string()))
        .collect()
}

/// A small but complete snapshot touching every entity kind.
fn base_snapshot() -> ExportData {
    let mut data = ExportData::new();

    data.mods.push(ExportMod {
        name: "base".into(),
        version: "1.1.0".into(),
        author: "wube".into(),
        titles: labels(&[("en", "Base mod")]),
        descriptions: LocaleMap::new(),
    });

    for (item_type, name, label) in [
        (ItemType::Item, "iron-ore", "Iron Ore"),
        (ItemType::Item, "iron-plate", "Iron Plate"),
        (ItemType::Fluid, "water", "Water"),
    ] {
        data.items.push(ExportItem {
            item_type,
            name: name.into(),
            labels: labels(&[("en", label)]),
            descriptions: LocaleMap::new(),
        });
    }

    data.machines.push(ExportMachine {
        name: "stone-furnace".into(),
        crafting_categories: vec!["smelting".into()],
        crafting_speed: 1.0,
        item_slots: 1,
        fluid_input_slots: 0,
        fluid_output_slots: 0,
        module_slots: 0,
        energy_usage: 90.0,
        energy_usage_unit: Default::default(),
        labels: labels(&[("en", "Stone Furnace")]),
        descriptions: LocaleMap::new(),
    });

    data.recipes.push(ExportRecipe {
        name: "iron-plate".into(),
        mode: Default::default(),
        crafting_time: 3.2,
        crafting_category: "smelting".into(),
        ingredients: vec![ExportIngredient {
            item_type: ItemType::Item,
            name: "iron-ore".into(),
            amount: 1.0,
        }],
        products: vec![ExportProduct {
            item_type: ItemType::Item,
            name: "iron-plate".into(),
            amount_min: 1.0,
            amount_max: 1.0,
            probability: 1.0,
        }],
        labels: labels(&[("en", "Iron Plate")]),
        descriptions: LocaleMap::new(),
    });

    data.icons.push(ExportIcon {
        image_hash: "aabbccdd".into(),
        size: 64,
    });
    data.rendered_icons.insert("aabbccdd".into(), vec![1, 2, 3, 4]);

    data.collect_crafting_categories();
    data
}

// ============================================================================
// Full Run
// ============================================================================

#[test]
fn full_snapshot_imports_every_kind() {
    let data = base_snapshot();
    let mut store = DataStore::new();
    let summary = ImportPipeline::default()
        .run(&data, &mut store, Uuid::from_u128(1))
        .unwrap();

    assert_eq!(summary.mods, 1);
    assert_eq!(summary.crafting_categories, 1);
    assert_eq!(summary.items, 3);
    assert_eq!(summary.machines, 1);
    assert_eq!(summary.recipes, 1);
    assert_eq!(summary.icon_images, 1);
    // base mod + 3 items + machine + recipe, one locale each
    assert_eq!(summary.translations, 6);
    assert_eq!(summary.orphans_removed, 0);

    let combination = store.combination(&Uuid::from_u128(1)).unwrap();
    for kind in [
        EntityKind::Mod,
        EntityKind::CraftingCategory,
        EntityKind::Item,
        EntityKind::Machine,
        EntityKind::Recipe,
        EntityKind::IconImage,
        EntityKind::Translation,
    ] {
        assert!(
            !combination.relations(kind).is_empty(),
            "no relations for {kind}"
        );
    }
}

#[test]
fn recipe_references_resolve_to_stored_entities() {
    let data = base_snapshot();
    let mut store = DataStore::new();
    ImportPipeline::default()
        .run(&data, &mut store, Uuid::from_u128(1))
        .unwrap();

    let combination = store.combination(&Uuid::from_u128(1)).unwrap();
    let recipe: Recipe = store
        .get(&combination.relations(EntityKind::Recipe)[0])
        .unwrap();

    let ingredient: Item = store.get(&recipe.ingredients[0].item).unwrap();
    assert_eq!(ingredient.name, "iron-ore");
    let product: Item = store.get(&recipe.products[0].item).unwrap();
    assert_eq!(product.name, "iron-plate");

    let machine: Machine = store
        .get(&combination.relations(EntityKind::Machine)[0])
        .unwrap();
    assert_eq!(machine.crafting_categories, vec![recipe.crafting_category]);
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn rerunning_the_same_snapshot_inserts_nothing() {
    let data = base_snapshot();
    let mut store = DataStore::new();
    let pipeline = ImportPipeline::default();

    let first = pipeline.run(&data, &mut store, Uuid::from_u128(1)).unwrap();
    let kinds = [
        EntityKind::Mod,
        EntityKind::CraftingCategory,
        EntityKind::Item,
        EntityKind::Machine,
        EntityKind::Recipe,
        EntityKind::IconImage,
        EntityKind::Translation,
    ];
    let inserted: Vec<u64> = kinds.iter().map(|kind| store.inserted(*kind)).collect();

    let second = pipeline.run(&data, &mut store, Uuid::from_u128(1)).unwrap();
    let inserted_again: Vec<u64> = kinds.iter().map(|kind| store.inserted(*kind)).collect();

    assert_eq!(first, second);
    assert_eq!(inserted, inserted_again);
}

#[test]
fn chunk_size_does_not_change_the_outcome() {
    let data = base_snapshot();

    let mut whole = DataStore::new();
    ImportPipeline::default()
        .run(&data, &mut whole, Uuid::from_u128(1))
        .unwrap();

    for chunk_size in [1, 2, 3] {
        let mut chunked = DataStore::new();
        ImportPipeline::new(chunk_size)
            .run(&data, &mut chunked, Uuid::from_u128(1))
            .unwrap();
        assert_eq!(
            chunked.combination(&Uuid::from_u128(1)),
            whole.combination(&Uuid::from_u128(1)),
            "chunk size {chunk_size} diverged"
        );
    }
}

// ============================================================================
// Sharing and Cleanup
// ============================================================================

#[test]
fn two_combinations_share_identical_entities() {
    let data = base_snapshot();
    let mut store = DataStore::new();
    let pipeline = ImportPipeline::default();

    pipeline.run(&data, &mut store, Uuid::from_u128(1)).unwrap();
    let items_inserted = store.inserted(EntityKind::Item);
    pipeline.run(&data, &mut store, Uuid::from_u128(2)).unwrap();

    assert_eq!(store.inserted(EntityKind::Item), items_inserted);
    assert_eq!(store.count(EntityKind::Item), 3);

    let first = store.combination(&Uuid::from_u128(1)).unwrap();
    let second = store.combination(&Uuid::from_u128(2)).unwrap();
    assert_eq!(
        first.relations(EntityKind::Item),
        second.relations(EntityKind::Item)
    );
}

#[test]
fn entities_dropped_from_a_snapshot_are_collected() {
    let mut data = base_snapshot();
    let mut store = DataStore::new();
    let pipeline = ImportPipeline::default();
    pipeline.run(&data, &mut store, Uuid::from_u128(1)).unwrap();

    // The next game version drops the water fluid.
    data.items.retain(|item| item.name != "water");
    let summary = pipeline.run(&data, &mut store, Uuid::from_u128(1)).unwrap();

    // The item row and its translation became unreferenced.
    assert_eq!(summary.orphans_removed, 2);
    assert_eq!(store.count(EntityKind::Item), 2);
}

#[test]
fn shared_entities_survive_combination_removal() {
    let data = base_snapshot();
    let mut store = DataStore::new();
    let pipeline = ImportPipeline::default();
    pipeline.run(&data, &mut store, Uuid::from_u128(1)).unwrap();
    pipeline.run(&data, &mut store, Uuid::from_u128(2)).unwrap();

    assert_eq!(pipeline.remove(&mut store, Uuid::from_u128(1)).unwrap(), 0);
    assert_eq!(store.count(EntityKind::Recipe), 1);

    let removed = pipeline.remove(&mut store, Uuid::from_u128(2)).unwrap();
    assert!(removed > 0);
    for kind in [
        EntityKind::Mod,
        EntityKind::CraftingCategory,
        EntityKind::Item,
        EntityKind::Machine,
        EntityKind::Recipe,
        EntityKind::IconImage,
        EntityKind::Translation,
    ] {
        assert_eq!(store.count(kind), 0, "rows left behind for {kind}");
    }
}

// ============================================================================
// Payload Refresh
// ============================================================================

#[test]
fn re_rendered_icons_refresh_without_new_rows() {
    let mut data = base_snapshot();
    let mut store = DataStore::new();
    let pipeline = ImportPipeline::default();
    pipeline.run(&data, &mut store, Uuid::from_u128(1)).unwrap();

    data.rendered_icons.insert("aabbccdd".into(), vec![9, 9]);
    pipeline.run(&data, &mut store, Uuid::from_u128(1)).unwrap();

    assert_eq!(store.inserted(EntityKind::IconImage), 1);
    let combination = store.combination(&Uuid::from_u128(1)).unwrap();
    let icon: IconImage = store
        .get(&combination.relations(EntityKind::IconImage)[0])
        .unwrap();
    assert_eq!(icon.data, vec![9, 9]);
}

// ============================================================================
// Translations
// ============================================================================

#[test]
fn redundant_recipe_and_machine_labels_are_flagged() {
    let mut data = base_snapshot();
    // Give the furnace an item of the same name with the same label so the
    // machine translation becomes redundant too.
    data.items.push(ExportItem {
        item_type: ItemType::Item,
        name: "stone-furnace".into(),
        labels: labels(&[("en", "Stone Furnace")]),
        descriptions: LocaleMap::new(),
    });

    let mut store = DataStore::new();
    ImportPipeline::default()
        .run(&data, &mut store, Uuid::from_u128(1))
        .unwrap();

    let combination = store.combination(&Uuid::from_u128(1)).unwrap();
    let translations: Vec<Translation> = combination
        .relations(EntityKind::Translation)
        .iter()
        .filter_map(|id| store.get(id))
        .collect();

    let recipe = translations
        .iter()
        .find(|t| t.translation_type == TranslationType::Recipe && t.name == "iron-plate")
        .unwrap();
    assert!(recipe.is_duplicated_by_recipe);

    let machine = translations
        .iter()
        .find(|t| t.translation_type == TranslationType::Machine)
        .unwrap();
    assert!(machine.is_duplicated_by_machine);

    // The base item translations themselves are never flagged.
    let item = translations
        .iter()
        .find(|t| t.translation_type == TranslationType::Item && t.name == "iron-plate")
        .unwrap();
    assert!(!item.is_duplicated_by_machine && !item.is_duplicated_by_recipe);
}

#[test]
fn changed_labels_replace_the_translation_relation() {
    let mut data = base_snapshot();
    let mut store = DataStore::new();
    let pipeline = ImportPipeline::default();
    pipeline.run(&data, &mut store, Uuid::from_u128(1)).unwrap();
    let before = store
        .combination(&Uuid::from_u128(1))
        .unwrap()
        .relations(EntityKind::Translation)
        .to_vec();

    data.items[0].labels = labels(&[("en", "Raw Iron")]);
    let summary = pipeline.run(&data, &mut store, Uuid::from_u128(1)).unwrap();
    let after = store
        .combination(&Uuid::from_u128(1))
        .unwrap()
        .relations(EntityKind::Translation)
        .to_vec();

    assert_ne!(before, after);
    assert_eq!(before.len(), after.len());
    // The superseded translation row was collected.
    assert_eq!(summary.orphans_removed, 1);
    assert_eq!(store.count(EntityKind::Translation), after.len());
}
