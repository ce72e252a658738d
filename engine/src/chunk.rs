//! Bounded, order-preserving windows over export entity sequences.
//!
//! A chunk is a `[offset, offset + limit)` slice of an ordered sequence.
//! Taking the same chunk of the same snapshot twice yields the identical
//! sub-sequence, which is what lets an external orchestrator hand disjoint
//! windows to parallel import processes and retry failed ones blindly.

use serde::{Deserialize, Serialize};

/// A `[offset, offset + limit)` window of an ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub offset: usize,
    pub limit: usize,
}

impl Chunk {
    /// Create a chunk.
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// The window of `entities` this chunk covers.
    ///
    /// Out-of-range offsets yield an empty slice; a window reaching past the
    /// end is truncated. Element order matches the input order, so disjoint
    /// chunks partition the sequence without gaps or overlaps.
    pub fn window<'a, T>(&self, entities: &'a [T]) -> &'a [T] {
        let start = self.offset.min(entities.len());
        let end = self.offset.saturating_add(self.limit).min(entities.len());
        &entities[start..end]
    }

    /// Split a sequence of `total` elements into consecutive chunks of at
    /// most `size` elements each.
    pub fn partition(total: usize, size: usize) -> Vec<Chunk> {
        let size = size.max(1);
        (0..total)
            .step_by(size)
            .map(|offset| Chunk::new(offset, size))
            .collect()
    }
}
