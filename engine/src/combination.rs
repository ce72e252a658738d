//! Combination - the aggregate root of one imported export snapshot.
//!
//! A combination gathers the identities of every entity that belongs to one
//! snapshot. Per-kind relations carry replace-all semantics: a run clears a
//! kind's collection once and each reconciled chunk appends its attached
//! set. Entities dropped from the collection are not deleted here; they stay
//! in the store until orphan cleanup finds them unreferenced by every
//! combination.

use crate::entity::EntityKind;
use crate::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// Aggregate grouping one full exported dataset snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combination {
    pub id: Uuid,
    relations: BTreeMap<EntityKind, Vec<EntityId>>,
}

impl Combination {
    /// Create an empty combination.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            relations: BTreeMap::new(),
        }
    }

    /// The related entity identities of one kind, in attach order.
    pub fn relations(&self, kind: EntityKind) -> &[EntityId] {
        self.relations.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Clear one kind's relation collection. Called once per kind at the
    /// start of a reconciliation run.
    pub fn clear_relations(&mut self, kind: EntityKind) {
        self.relations.remove(&kind);
    }

    /// Append a chunk's attached set to one kind's relation collection,
    /// skipping identities already attached.
    pub fn extend_relations(&mut self, kind: EntityKind, ids: impl IntoIterator<Item = EntityId>) {
        let collection = self.relations.entry(kind).or_default();
        let mut attached: HashSet<EntityId> = collection.iter().copied().collect();
        for id in ids {
            if attached.insert(id) {
                collection.push(id);
            }
        }
    }

    /// Replace one kind's relation collection entirely.
    pub fn replace_relations(&mut self, kind: EntityKind, ids: Vec<EntityId>) {
        self.clear_relations(kind);
        self.extend_relations(kind, ids);
    }
}
