use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::effects::{EffectKind, FilterBindings};

/// An effect together with the catalog filter that selected it
///
/// Cloning is cheap: the id is shared, so the frame loop can tag every
/// presented frame without allocating.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub kind: EffectKind,
    /// `None` when the effect was chosen directly rather than by filter id
    pub filter_id: Option<Arc<str>>,
}

/// The filter the user has selected, shared between the UI side and the
/// frame loop
///
/// Kind and id change together under one short lock, so the loop never sees
/// an effect paired with another filter's id.
#[derive(Debug)]
pub struct ActiveFilter {
    bindings: FilterBindings,
    current: Mutex<Selection>,
}

impl ActiveFilter {
    /// Nothing selected; the loop runs Normal
    pub fn new(bindings: FilterBindings) -> Self {
        Self {
            bindings,
            current: Mutex::new(Selection::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Selection> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Select a catalog filter by id, returning the effect that will run
    ///
    /// Ids the catalog does not know still select, and run Normal.
    pub fn select_filter(&self, id: &str) -> EffectKind {
        let kind = self.bindings.resolve(id);
        *self.lock() = Selection {
            kind,
            filter_id: Some(Arc::from(id)),
        };

        tracing::debug!(filter_id = id, effect = %kind, "Filter selected");
        kind
    }

    /// Run an effect directly, without a catalog filter behind it
    ///
    /// Clears the selected filter id, so captures are refused until a filter
    /// is selected again.
    pub fn select_kind(&self, kind: EffectKind) {
        *self.lock() = Selection {
            kind,
            filter_id: None,
        };
    }

    /// Back to no selection
    pub fn clear(&self) {
        self.select_kind(EffectKind::Normal);
    }

    /// Effect and filter id the next frame will be rendered with
    pub fn current(&self) -> Selection {
        self.lock().clone()
    }

    /// The effect the next frame will run
    pub fn kind(&self) -> EffectKind {
        self.lock().kind
    }

    pub fn filter_id(&self) -> Option<String> {
        self.lock().filter_id.as_deref().map(str::to_string)
    }

    pub fn bindings(&self) -> &FilterBindings {
        &self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectRegistry, FilterCatalog};

    fn seeded() -> ActiveFilter {
        ActiveFilter::new(EffectRegistry::new().bind(&FilterCatalog::seeded()))
    }

    #[test]
    fn test_defaults_to_normal_without_id() {
        let selection = seeded();
        assert_eq!(selection.kind(), EffectKind::Normal);
        assert_eq!(selection.filter_id(), None);
    }

    #[test]
    fn test_select_by_id() {
        let selection = seeded();

        assert_eq!(selection.select_filter("2"), EffectKind::BlackAndWhite);
        assert_eq!(selection.kind(), EffectKind::BlackAndWhite);
        assert_eq!(selection.filter_id().as_deref(), Some("2"));

        assert_eq!(selection.select_filter("missing"), EffectKind::Normal);
        assert_eq!(selection.filter_id().as_deref(), Some("missing"));
    }

    #[test]
    fn test_select_kind_clears_id() {
        let selection = seeded();
        selection.select_filter("15");
        selection.select_kind(EffectKind::Anime);

        assert_eq!(selection.kind(), EffectKind::Anime);
        assert_eq!(selection.filter_id(), None);

        selection.clear();
        assert_eq!(selection.kind(), EffectKind::Normal);
    }

    #[test]
    fn test_current_pairs_kind_with_id() {
        let selection = seeded();
        selection.select_filter("9");

        let current = selection.current();
        assert_eq!(current.kind, EffectKind::Vintage);
        assert_eq!(current.filter_id.as_deref(), Some("9"));

        // A snapshot taken earlier is unaffected by later selections
        selection.select_kind(EffectKind::Neon);
        assert_eq!(current.kind, EffectKind::Vintage);
        assert_eq!(selection.current().filter_id, None);
    }
}
