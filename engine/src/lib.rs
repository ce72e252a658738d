//! # Moddex Engine
//!
//! A deterministic import engine for game-mod export snapshots.
//!
//! This crate provides the core logic for mapping exported game data onto a
//! persistent, deduplicated entity store. It handles content-addressed
//! identity, chunked reconciliation, translation aggregation, and orphan
//! cleanup with guaranteed determinism - the same snapshot always produces
//! the same stored state.
//!
//! ## Design Principles
//!
//! - **No IO**: Engine has no knowledge of files, network, or databases
//! - **Deterministic**: Same inputs always produce same outputs
//! - **Idempotent**: Re-importing a snapshot performs zero inserts
//! - **Testable**: Pure logic over trait seams, no mocks needed
//!
//! ## Core Concepts
//!
//! ### Content-Addressed Identity
//!
//! Every entity's id is derived from its semantic fields via [`ContentHash`]:
//! equal content yields an equal [`EntityId`], across runs and processes.
//! Deduplication therefore never needs lookups by secondary keys, and two
//! import processes can insert the same entity without coordinating.
//!
//! ### Chunked Reconciliation
//!
//! An export snapshot is consumed in `[offset, offset + limit)` [`Chunk`]s.
//! Each chunk is diffed against the store in one batched lookup and
//! committed in one batched flush; an external orchestrator can hand
//! disjoint chunks to parallel processes and blindly retry failed ones.
//!
//! ### Strategies
//!
//! The generic [`Reconciler`] is parameterized by an [`EntityStrategy`] per
//! entity kind (mods, crafting categories, items, machines, recipes, icon
//! images). Strategies only supply the kind-specific steps: slicing the
//! export, resolving references, building the entity, and copying
//! non-identity payload onto reused records.
//!
//! ### Combinations
//!
//! A [`Combination`] groups everything imported from one snapshot. Entities
//! are shared across combinations; rows no combination references are
//! removed by orphan cleanup at the end of a run.
//!
//! ## Quick Start
//!
//! ```rust
//! use moddex_engine::{DataStore, ExportData, ImportPipeline};
//! use moddex_engine::export::ExportItem;
//! use moddex_engine::entity::ItemType;
//! use uuid::Uuid;
//!
//! let mut data = ExportData::new();
//! data.items.push(ExportItem {
//!     item_type: ItemType::Item,
//!     name: "iron-plate".into(),
//!     labels: Default::default(),
//!     descriptions: Default::default(),
//! });
//!
//! let mut store = DataStore::new();
//! let combination_id = Uuid::new_v4();
//! let summary = ImportPipeline::default()
//!     .run(&data, &mut store, combination_id)
//!     .unwrap();
//! assert_eq!(summary.items, 1);
//!
//! // Re-running the identical snapshot inserts nothing.
//! let again = ImportPipeline::default()
//!     .run(&data, &mut store, combination_id)
//!     .unwrap();
//! assert_eq!(again.items, 1);
//! ```
//!
//! ## Persistence
//!
//! [`DataStore`] is the in-memory implementation of the store seams
//! ([`KindStore`], [`CategoryLookup`], [`ItemLookup`]). It serializes to
//! JSON with deterministic ordering; a database-backed adapter implements
//! the same traits.

pub mod chunk;
pub mod combination;
pub mod entity;
pub mod error;
pub mod export;
pub mod identity;
pub mod pipeline;
pub mod reconcile;
pub mod resolve;
pub mod store;
pub mod strategy;
pub mod translation;
pub mod validate;

// Re-export main types at crate root
pub use chunk::Chunk;
pub use combination::Combination;
pub use entity::{Entity, EntityKind};
pub use error::{Error, Result};
pub use export::{ExportData, ExportSource};
pub use identity::{ContentHash, IdHasher};
pub use pipeline::{ImportPipeline, ImportSummary};
pub use reconcile::{EntityStrategy, Reconciler};
pub use resolve::ReferenceResolver;
pub use store::{CategoryLookup, DataStore, ItemLookup, KindStore, ReferenceLookup};
pub use translation::TranslationAggregator;
pub use validate::Validate;

/// Type aliases for clarity
pub type EntityId = uuid::Uuid;
pub type LocaleMap = std::collections::BTreeMap<String, String>;
