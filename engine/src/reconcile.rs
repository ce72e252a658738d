//! Generic diff/persist reconciliation.
//!
//! One [`Reconciler`] instance handles one entity kind, parameterized by an
//! [`EntityStrategy`] that knows how to slice the export, resolve the kind's
//! cross-entity references, build an entity from an export record, and copy
//! non-identity payload onto a reused record. Everything else - validation,
//! identity assignment, the batched diff against the store, attachment to
//! the combination - is shared here.
//!
//! # Per-chunk algorithm
//!
//! 1. Resolve the chunk's cross-entity references in batched lookups.
//! 2. Build each entity, clamp its fields, assign its content identity.
//! 3. One batched `find_by_ids` against the store for the whole chunk.
//! 4. Found identities reuse the stored record (refreshing non-identity
//!    payload); unseen identities are staged for insertion.
//! 5. One batched flush; the full reused+new set is attached to the
//!    combination.
//!
//! A chunk either completes fully or returns an error before anything was
//! flushed; because identity is content-derived, blindly retrying a chunk
//! (or re-running an identical import) performs zero duplicate inserts.

use crate::chunk::Chunk;
use crate::entity::Entity;
use crate::error::Result;
use crate::export::ExportSource;
use crate::identity::ContentHash;
use crate::resolve::ReferenceResolver;
use crate::store::{KindStore, ReferenceLookup};
use crate::validate::Validate;
use crate::{Combination, EntityId};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// The kind-specific steps of reconciliation.
///
/// Strategies are small stateless objects selected by composition; all
/// shared behavior lives in [`Reconciler`].
pub trait EntityStrategy {
    /// The export record this kind is computed from.
    type Export;
    /// The persisted entity this kind produces.
    type Entity: Entity + Validate;

    /// The export's full ordered sequence for this kind.
    fn export_entities<'a>(&self, source: &'a dyn ExportSource) -> &'a [Self::Export];

    /// Resolve the chunk's cross-entity references in batched lookups.
    /// Kinds without references keep the default no-op.
    fn prepare(
        &self,
        _exports: &[Self::Export],
        _resolver: &mut ReferenceResolver,
        _lookup: &dyn ReferenceLookup,
    ) -> Result<()> {
        Ok(())
    }

    /// Build the target entity from one export record. Identity fields only;
    /// the reconciler clamps and assigns the id afterwards.
    fn build(
        &self,
        export: &Self::Export,
        source: &dyn ExportSource,
        resolver: &ReferenceResolver,
    ) -> Result<Self::Entity>;

    /// Copy non-identity payload from a freshly built entity onto the stored
    /// record being reused. Returns whether anything changed; `true` makes
    /// the reconciler stage the refreshed record. Default: nothing to copy.
    fn copy_payload(&self, _fresh: &Self::Entity, _stored: &mut Self::Entity) -> bool {
        false
    }
}

/// Generic diff/persist engine for one entity kind.
#[derive(Debug)]
pub struct Reconciler<S: EntityStrategy> {
    strategy: S,
}

impl<S: EntityStrategy> Reconciler<S> {
    /// Create a reconciler for one kind.
    pub fn new(strategy: S) -> Self {
        Self { strategy }
    }

    /// Reconcile one chunk of this kind for one combination.
    ///
    /// Returns the attached identity set in export order, deduplicated.
    /// Fails fast: an unresolved reference or store error aborts the chunk
    /// before the flush, leaving no committed rows behind.
    pub fn reconcile_chunk<St>(
        &self,
        source: &dyn ExportSource,
        chunk: Chunk,
        resolver: &mut ReferenceResolver,
        store: &mut St,
        combination: &mut Combination,
    ) -> Result<Vec<EntityId>>
    where
        St: KindStore<S::Entity> + ReferenceLookup,
    {
        let exports = chunk.window(self.strategy.export_entities(source));
        if exports.is_empty() {
            return Ok(Vec::new());
        }

        self.strategy.prepare(exports, resolver, &*store)?;

        let mut fresh = Vec::with_capacity(exports.len());
        for export in exports {
            let mut entity = self.strategy.build(export, source, resolver)?;
            entity.validate();
            let id = entity.calculate_id();
            entity.set_id(id);
            fresh.push(entity);
        }

        let ids: Vec<EntityId> = fresh.iter().map(Entity::id).collect();
        let mut stored: HashMap<EntityId, S::Entity> = store
            .find_by_ids(&ids)?
            .into_iter()
            .map(|entity| (entity.id(), entity))
            .collect();

        let mut attached = Vec::with_capacity(fresh.len());
        let mut seen = HashSet::with_capacity(fresh.len());
        let mut new_count = 0usize;
        for entity in fresh {
            let id = entity.id();
            if !seen.insert(id) {
                // Identical export rows within one chunk converge on one row.
                continue;
            }
            match stored.get_mut(&id) {
                Some(existing) => {
                    if self.strategy.copy_payload(&entity, existing) {
                        store.persist(existing.clone())?;
                    }
                }
                None => {
                    new_count += 1;
                    store.persist(entity)?;
                }
            }
            attached.push(id);
        }

        store.flush()?;
        combination.extend_relations(<S::Entity as Entity>::KIND, attached.iter().copied());

        debug!(
            kind = %<S::Entity as Entity>::KIND,
            offset = chunk.offset,
            limit = chunk.limit,
            attached = attached.len(),
            new = new_count,
            "reconciled chunk"
        );
        Ok(attached)
    }

    /// Delete every stored record of this kind no combination references.
    ///
    /// Invoked once after all chunks of all kinds of a run completed, so an
    /// entity shared across combinations survives as long as one reference
    /// remains.
    pub fn cleanup<St: KindStore<S::Entity>>(&self, store: &mut St) -> Result<usize> {
        store.remove_orphans()
    }
}
