//! Filter records as the catalog service hands them out, and the id→effect
//! table the frame loop dispatches through.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::effects::kind::EffectKind;

/// A persisted filter record
///
/// Only `name` decides which effect runs; `id` is what selections and photo
/// records refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FilterDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            description: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Seed order of the built-in filters; ids are assigned from 1 in this order
const SEED_ORDER: [EffectKind; 15] = [
    EffectKind::Normal,
    EffectKind::BlackAndWhite,
    EffectKind::Brightness,
    EffectKind::Contrast,
    EffectKind::Disney,
    EffectKind::Anime,
    EffectKind::ComicHero,
    EffectKind::Pixar,
    EffectKind::Vintage,
    EffectKind::Rainbow,
    EffectKind::PixelArt,
    EffectKind::Cartoon,
    EffectKind::OilPainting,
    EffectKind::ComicBook,
    EffectKind::Neon,
];

/// Ordered list of filter descriptors, sorted by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCatalog {
    filters: Vec<FilterDescriptor>,
}

impl FilterCatalog {
    /// The 15 built-in filters with ids "1" to "15"
    pub fn seeded() -> Self {
        let filters = SEED_ORDER
            .iter()
            .enumerate()
            .map(|(position, kind)| {
                let effect = kind.effect();
                FilterDescriptor::new((position + 1).to_string(), effect.name())
                    .with_category(effect.category().as_str())
                    .with_description(effect.description())
            })
            .collect();
        Self::from_descriptors(filters)
    }

    /// Build a catalog from arbitrary records
    ///
    /// Later records with a duplicate id are dropped.
    pub fn from_descriptors(descriptors: Vec<FilterDescriptor>) -> Self {
        let mut filters: Vec<FilterDescriptor> = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if filters.iter().any(|existing| existing.id == descriptor.id) {
                tracing::warn!(id = %descriptor.id, "Duplicate filter id ignored");
                continue;
            }
            filters.push(descriptor);
        }
        filters.sort_by(|a, b| a.name.cmp(&b.name));
        Self { filters }
    }

    pub fn get(&self, id: &str) -> Option<&FilterDescriptor> {
        self.filters.iter().find(|filter| filter.id == id)
    }

    /// First record with exactly this name
    pub fn find_by_name(&self, name: &str) -> Option<&FilterDescriptor> {
        self.filters.iter().find(|filter| filter.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Filter id → effect, resolved once when the catalog is loaded
#[derive(Debug, Clone, Default)]
pub struct FilterBindings {
    by_id: HashMap<String, EffectKind>,
}

impl FilterBindings {
    pub(crate) fn from_map(by_id: HashMap<String, EffectKind>) -> Self {
        Self { by_id }
    }

    /// Effect for a filter id; unknown ids run Normal
    pub fn resolve(&self, id: &str) -> EffectKind {
        self.get(id).unwrap_or_default()
    }

    pub fn get(&self, id: &str) -> Option<EffectKind> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
