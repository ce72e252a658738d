//! Error types for the moddex engine.

use crate::entity::ItemType;
use thiserror::Error;

/// All possible errors from the moddex engine.
///
/// Reference errors and persistence errors are fatal to the chunk being
/// processed. Validation never produces an error; out-of-range values are
/// clamped instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Unresolved cross-entity references
    #[error("unresolved crafting category reference: {0}")]
    MissingCraftingCategory(String),

    #[error("unresolved item reference: {item_type} {name}")]
    MissingItem { item_type: ItemType, name: String },

    #[error("missing rendered icon: {0}")]
    MissingRenderedIcon(String),

    // Store errors
    #[error("store operation failed: {0}")]
    Persistence(String),

    #[error("combination not found: {0}")]
    CombinationNotFound(uuid::Uuid),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::MissingCraftingCategory("smelting".into());
        assert_eq!(
            err.to_string(),
            "unresolved crafting category reference: smelting"
        );

        let err = Error::MissingItem {
            item_type: ItemType::Fluid,
            name: "heavy-oil".into(),
        };
        assert_eq!(err.to_string(), "unresolved item reference: fluid heavy-oil");

        let err = Error::Persistence("flush failed".into());
        assert_eq!(err.to_string(), "store operation failed: flush failed");
    }
}
