//! Validation by clamping.
//!
//! The store has fixed column widths and unsigned numeric ranges. Instead of
//! rejecting out-of-range export data, validation clamps values in place and
//! never fails; the clamped values are what identity calculation and
//! persistence see.

use crate::entity::{
    CraftingCategory, IconImage, Item, Machine, Mod, Recipe, Translation,
};

/// Maximum length of entity names, versions and translation values.
pub const MAX_TEXT_LENGTH: usize = 255;
/// Maximum length of translation descriptions.
pub const MAX_DESCRIPTION_LENGTH: usize = 65_535;
/// Maximum length of locale codes.
pub const MAX_LOCALE_LENGTH: usize = 8;

/// Truncate a string to at most `max` characters.
pub fn clamp_text(value: &mut String, max: usize) {
    if let Some((index, _)) = value.char_indices().nth(max) {
        value.truncate(index);
    }
}

/// Clamp a floating point attribute to a finite, non-negative value.
pub fn clamp_number(value: f64) -> f64 {
    if !value.is_finite() || value < 0.0 {
        0.0
    } else {
        value
    }
}

/// Clamp a probability to `[0, 1]`.
pub fn clamp_probability(value: f64) -> f64 {
    clamp_number(value).min(1.0)
}

/// Entities whose fields can be clamped into the store's ranges.
pub trait Validate {
    /// Clamp fields in place. Never fails.
    fn validate(&mut self);
}

impl Validate for Mod {
    fn validate(&mut self) {
        clamp_text(&mut self.name, MAX_TEXT_LENGTH);
        clamp_text(&mut self.version, MAX_TEXT_LENGTH);
        clamp_text(&mut self.author, MAX_TEXT_LENGTH);
    }
}

impl Validate for CraftingCategory {
    fn validate(&mut self) {
        clamp_text(&mut self.name, MAX_TEXT_LENGTH);
    }
}

impl Validate for Item {
    fn validate(&mut self) {
        clamp_text(&mut self.name, MAX_TEXT_LENGTH);
    }
}

impl Validate for Machine {
    fn validate(&mut self) {
        clamp_text(&mut self.name, MAX_TEXT_LENGTH);
        self.crafting_speed = clamp_number(self.crafting_speed);
        self.energy_usage = clamp_number(self.energy_usage);
    }
}

impl Validate for Recipe {
    fn validate(&mut self) {
        clamp_text(&mut self.name, MAX_TEXT_LENGTH);
        self.crafting_time = clamp_number(self.crafting_time);
        for ingredient in &mut self.ingredients {
            ingredient.amount = clamp_number(ingredient.amount);
        }
        for product in &mut self.products {
            product.amount_min = clamp_number(product.amount_min);
            product.amount_max = clamp_number(product.amount_max);
            product.probability = clamp_probability(product.probability);
        }
    }
}

impl Validate for IconImage {
    fn validate(&mut self) {
        clamp_text(&mut self.image_hash, MAX_TEXT_LENGTH);
    }
}

impl Validate for Translation {
    fn validate(&mut self) {
        clamp_text(&mut self.locale, MAX_LOCALE_LENGTH);
        clamp_text(&mut self.name, MAX_TEXT_LENGTH);
        clamp_text(&mut self.value, MAX_TEXT_LENGTH);
        clamp_text(&mut self.description, MAX_DESCRIPTION_LENGTH);
    }
}
