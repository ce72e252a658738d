//! Aggregation and deduplication of localized text.
//!
//! Labels and descriptions for one (type, name) can arrive from different
//! source passes, so `add` converges them onto one [`Translation`] per
//! (locale, type, name). A second pass, `optimize`, flags machine and recipe
//! translations that are redundant with a more generic item (or fluid)
//! translation of the same name. Flagged translations are kept; callers use
//! the flags to suppress redundant display.

use crate::entity::{Translation, TranslationType};
use crate::LocaleMap;
use std::collections::{BTreeMap, BTreeSet};

/// Key of one translation within an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct TranslationKey {
    locale: String,
    translation_type: TranslationType,
    name: String,
}

/// Collects and deduplicates localized strings across entity kinds.
///
/// Scoped to one import run; uses a sorted map so the flattened output
/// order is stable, though no meaning is attached to it.
#[derive(Debug, Default)]
pub struct TranslationAggregator {
    translations: BTreeMap<TranslationKey, Translation>,
}

impl TranslationAggregator {
    /// Create an empty aggregator for a new run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one entity's label and description maps into the run.
    ///
    /// For every locale present in either map, the translation keyed by
    /// (locale, type, name) is created or fetched, then its value and
    /// description are set from whichever maps carry that locale.
    pub fn add(
        &mut self,
        translation_type: TranslationType,
        name: &str,
        labels: &LocaleMap,
        descriptions: &LocaleMap,
    ) {
        let locales: BTreeSet<&String> = labels.keys().chain(descriptions.keys()).collect();
        for locale in locales {
            let key = TranslationKey {
                locale: locale.clone(),
                translation_type,
                name: name.to_string(),
            };
            let translation = self
                .translations
                .entry(key)
                .or_insert_with(|| Translation::new(locale.clone(), translation_type, name));

            if let Some(value) = labels.get(locale) {
                translation.value = value.clone();
            }
            if let Some(description) = descriptions.get(locale) {
                translation.description = description.clone();
            }
        }
    }

    /// Flag machine and recipe translations that duplicate a more generic
    /// translation of the same (locale, name).
    ///
    /// Machines are checked against items. Recipes are checked against items
    /// first, then fluids - first match wins: once an item translation
    /// exists for the name, the fluid translation is never consulted, even
    /// if the item comparison fails.
    pub fn optimize(&mut self) {
        let mut machine_flags = Vec::new();
        let mut recipe_flags = Vec::new();

        for (key, translation) in &self.translations {
            match key.translation_type {
                TranslationType::Machine => {
                    if let Some(base) = self.lookup(&key.locale, TranslationType::Item, &key.name) {
                        if is_duplicate(translation, base) {
                            machine_flags.push(key.clone());
                        }
                    }
                }
                TranslationType::Recipe => {
                    let base = self
                        .lookup(&key.locale, TranslationType::Item, &key.name)
                        .or_else(|| self.lookup(&key.locale, TranslationType::Fluid, &key.name));
                    if let Some(base) = base {
                        if is_duplicate(translation, base) {
                            recipe_flags.push(key.clone());
                        }
                    }
                }
                _ => {}
            }
        }

        for key in machine_flags {
            if let Some(translation) = self.translations.get_mut(&key) {
                translation.is_duplicated_by_machine = true;
            }
        }
        for key in recipe_flags {
            if let Some(translation) = self.translations.get_mut(&key) {
                translation.is_duplicated_by_recipe = true;
            }
        }
    }

    fn lookup(
        &self,
        locale: &str,
        translation_type: TranslationType,
        name: &str,
    ) -> Option<&Translation> {
        self.translations.get(&TranslationKey {
            locale: locale.to_string(),
            translation_type,
            name: name.to_string(),
        })
    }

    /// Number of aggregated translations.
    pub fn len(&self) -> usize {
        self.translations.len()
    }

    /// Whether the run collected no translations.
    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    /// Flatten the nested structure into an output sequence for
    /// persistence. No further meaning is attached to the order.
    pub fn into_translations(self) -> Vec<Translation> {
        self.translations.into_values().collect()
    }
}

/// A translation duplicates a base translation when the values match and
/// its description is either empty or matches the base description.
fn is_duplicate(candidate: &Translation, base: &Translation) -> bool {
    candidate.value == base.value
        && (candidate.description.is_empty() || candidate.description == base.description)
}
