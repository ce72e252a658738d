//! Full import run over one export snapshot.
//!
//! [`ImportPipeline`] drives the per-kind reconcilers in dependency order
//! (mods, crafting categories, items, machines, recipes, icon images), then
//! aggregates and persists translations, saves the combination, and finally
//! garbage-collects orphaned rows. One run maps one export snapshot onto one
//! combination; re-running the same snapshot performs zero inserts.

use crate::chunk::Chunk;
use crate::combination::Combination;
use crate::entity::{
    CraftingCategory, Entity, EntityKind, IconImage, Item, Machine, Mod, Recipe, Translation,
    TranslationType,
};
use crate::error::{Error, Result};
use crate::export::ExportSource;
use crate::identity::ContentHash;
use crate::reconcile::{EntityStrategy, Reconciler};
use crate::resolve::ReferenceResolver;
use crate::store::{DataStore, KindStore};
use crate::strategy::{
    CraftingCategoryStrategy, IconImageStrategy, ItemStrategy, MachineStrategy, ModStrategy,
    RecipeStrategy,
};
use crate::translation::TranslationAggregator;
use crate::validate::Validate;
use crate::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Per-kind attach counts and cleanup tally of one import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub mods: usize,
    pub crafting_categories: usize,
    pub items: usize,
    pub machines: usize,
    pub recipes: usize,
    pub icon_images: usize,
    pub translations: usize,
    pub orphans_removed: usize,
}

/// Drives one full import run against a store.
#[derive(Debug, Clone, Copy)]
pub struct ImportPipeline {
    chunk_size: usize,
}

impl Default for ImportPipeline {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ImportPipeline {
    /// Create a pipeline with an explicit chunk size (clamped to at least 1).
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Import one export snapshot into the combination with the given id.
    ///
    /// The combination is fetched if it exists, created otherwise. Each
    /// kind's relation collection is replaced by what this snapshot
    /// contains; rows no combination references afterwards are removed. On
    /// error the store keeps whatever chunks had already been flushed, and
    /// the combination under `combination_id` is left untouched; identity
    /// being content-derived makes a blind retry safe.
    pub fn run(
        &self,
        source: &dyn ExportSource,
        store: &mut DataStore,
        combination_id: Uuid,
    ) -> Result<ImportSummary> {
        let mut combination = store
            .combination(&combination_id)
            .cloned()
            .unwrap_or_else(|| Combination::new(combination_id));
        let mut resolver = ReferenceResolver::new();

        let mut summary = ImportSummary::default();
        summary.mods = self.run_kind(ModStrategy, source, &mut resolver, store, &mut combination)?;
        summary.crafting_categories = self.run_kind(
            CraftingCategoryStrategy,
            source,
            &mut resolver,
            store,
            &mut combination,
        )?;
        summary.items =
            self.run_kind(ItemStrategy, source, &mut resolver, store, &mut combination)?;
        summary.machines = self.run_kind(
            MachineStrategy,
            source,
            &mut resolver,
            store,
            &mut combination,
        )?;
        summary.recipes = self.run_kind(
            RecipeStrategy,
            source,
            &mut resolver,
            store,
            &mut combination,
        )?;
        summary.icon_images = self.run_kind(
            IconImageStrategy,
            source,
            &mut resolver,
            store,
            &mut combination,
        )?;

        summary.translations = self.run_translations(source, store, &mut combination)?;

        // Commit the relation state before cleanup so rows this run attached
        // are referenced when orphans are collected.
        store.save_combination(combination);
        summary.orphans_removed = self.cleanup(store)?;

        info!(
            combination = %combination_id,
            orphans_removed = summary.orphans_removed,
            "import run finished"
        );
        Ok(summary)
    }

    /// Remove a combination and garbage-collect the rows only it referenced.
    ///
    /// Entities shared with other combinations survive. Returns the number
    /// of rows removed.
    pub fn remove(&self, store: &mut DataStore, combination_id: Uuid) -> Result<usize> {
        store
            .remove_combination(&combination_id)
            .ok_or(Error::CombinationNotFound(combination_id))?;
        let removed = self.cleanup(store)?;
        info!(combination = %combination_id, removed, "combination removed");
        Ok(removed)
    }

    /// Reconcile one kind to completion, chunk by chunk. Returns the size of
    /// the kind's attached set.
    fn run_kind<S>(
        &self,
        strategy: S,
        source: &dyn ExportSource,
        resolver: &mut ReferenceResolver,
        store: &mut DataStore,
        combination: &mut Combination,
    ) -> Result<usize>
    where
        S: EntityStrategy,
        DataStore: KindStore<S::Entity>,
    {
        let kind = <S::Entity as Entity>::KIND;
        let total = strategy.export_entities(source).len();
        combination.clear_relations(kind);

        let reconciler = Reconciler::new(strategy);
        for chunk in Chunk::partition(total, self.chunk_size) {
            reconciler.reconcile_chunk(source, chunk, resolver, store, combination)?;
        }

        let attached = combination.relations(kind).len();
        info!(kind = %kind, total, attached, "reconciled kind");
        Ok(attached)
    }

    /// Aggregate the snapshot's localized text, flag duplicates, and persist
    /// the result as this combination's translation set.
    fn run_translations(
        &self,
        source: &dyn ExportSource,
        store: &mut DataStore,
        combination: &mut Combination,
    ) -> Result<usize> {
        let mut aggregator = TranslationAggregator::new();
        for export in source.mods() {
            aggregator.add(
                TranslationType::Mod,
                &export.name,
                &export.titles,
                &export.descriptions,
            );
        }
        for export in source.items() {
            aggregator.add(
                export.item_type.into(),
                &export.name,
                &export.labels,
                &export.descriptions,
            );
        }
        for export in source.machines() {
            aggregator.add(
                TranslationType::Machine,
                &export.name,
                &export.labels,
                &export.descriptions,
            );
        }
        for export in source.recipes() {
            aggregator.add(
                TranslationType::Recipe,
                &export.name,
                &export.labels,
                &export.descriptions,
            );
        }
        aggregator.optimize();

        let mut prepared: Vec<Translation> = aggregator.into_translations();
        for translation in &mut prepared {
            translation.validate();
            let id = translation.calculate_id();
            translation.set_id(id);
        }

        let ids: Vec<EntityId> = prepared.iter().map(Entity::id).collect();
        let stored: HashSet<EntityId> = KindStore::<Translation>::find_by_ids(store, &ids)?
            .into_iter()
            .map(|translation| translation.id())
            .collect();

        let mut attached = Vec::with_capacity(prepared.len());
        let mut seen = HashSet::with_capacity(prepared.len());
        for translation in prepared {
            let id = translation.id();
            if !seen.insert(id) {
                continue;
            }
            if !stored.contains(&id) {
                KindStore::<Translation>::persist(store, translation)?;
            }
            attached.push(id);
        }
        KindStore::<Translation>::flush(store)?;
        combination.replace_relations(EntityKind::Translation, attached.clone());

        info!(attached = attached.len(), "aggregated translations");
        Ok(attached.len())
    }

    /// Remove every row no combination references, across all kinds.
    fn cleanup(&self, store: &mut DataStore) -> Result<usize> {
        let mut removed = 0;
        removed += KindStore::<Mod>::remove_orphans(store)?;
        removed += KindStore::<CraftingCategory>::remove_orphans(store)?;
        removed += KindStore::<Item>::remove_orphans(store)?;
        removed += KindStore::<Machine>::remove_orphans(store)?;
        removed += KindStore::<Recipe>::remove_orphans(store)?;
        removed += KindStore::<IconImage>::remove_orphans(store)?;
        removed += KindStore::<Translation>::remove_orphans(store)?;
        Ok(removed)
    }
}
