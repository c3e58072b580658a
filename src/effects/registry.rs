use std::collections::HashMap;

use crate::effects::{
    catalog::{FilterBindings, FilterCatalog},
    kind::EffectKind,
    traits::Effect,
};

/// Registry mapping catalog names to effects
///
/// The registry provides a central place to discover effects. Every built-in
/// effect is registered under its catalog name; additional aliases may be
/// registered for renamed catalog records.
pub struct EffectRegistry {
    effects: HashMap<String, EffectKind>,
}

impl EffectRegistry {
    /// Create a new registry with all built-in effects
    pub fn new() -> Self {
        let mut registry = Self {
            effects: HashMap::new(),
        };

        registry.register_builtin_effects();
        registry
    }

    fn register_builtin_effects(&mut self) {
        for kind in EffectKind::ALL {
            self.effects.insert(kind.name().to_string(), kind);
        }
    }

    /// Register an alias name for a built-in effect
    ///
    /// # Arguments
    ///
    /// * `name` - Exact catalog name to match
    /// * `kind` - Effect that runs for that name
    pub fn register(&mut self, name: impl Into<String>, kind: EffectKind) {
        self.effects.insert(name.into(), kind);
    }

    /// Get an effect by exact name
    pub fn get_effect(&self, name: &str) -> Option<&'static dyn Effect> {
        self.effects.get(name).map(|kind| kind.effect())
    }

    /// Kind for a name; names that match nothing run Normal
    pub fn resolve(&self, name: &str) -> EffectKind {
        match self.effects.get(name) {
            Some(kind) => *kind,
            None => {
                tracing::debug!(name, "No effect registered for filter name, using Normal");
                EffectKind::Normal
            }
        }
    }

    /// Resolve every catalog record once into an id → effect table
    pub fn bind(&self, catalog: &FilterCatalog) -> FilterBindings {
        let by_id = catalog
            .iter()
            .map(|filter| (filter.id.clone(), self.resolve(&filter.name)))
            .collect();
        FilterBindings::from_map(by_id)
    }

    /// Get all registered names, sorted
    pub fn available_effects(&self) -> Vec<String> {
        let mut names: Vec<String> = self.effects.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_effect(&self, name: &str) -> bool {
        self.effects.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}
