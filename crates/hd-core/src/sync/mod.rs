use ahash::AHashMap;
use serde::Serialize;

use crate::events::ViewId;
use crate::selection::Selection;

mod engine;

pub use engine::{Discard, Hover, SyncEngine, SyncOutcome, SyncSnapshot};

/// How a view participates in synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewSyncSettings {
    /// May establish the selection
    pub can_brush: bool,

    /// Zoom, autorange and constraint events from this view move the range
    pub drives_range: bool,

    /// Row set is bounded by the week range (otherwise the whole year is shown)
    pub follows_range: bool,

    /// Reacts to the shared selection
    pub follows_selection: bool,

    /// Has a zoomable week axis; a double-click on it also drops the selection
    pub zoomable: bool,

    /// Rows without a mean length of stay are dropped
    pub requires_mean_los: bool,
}

impl Default for ViewSyncSettings {
    fn default() -> Self {
        Self {
            can_brush: false,
            drives_range: false,
            follows_range: true,
            follows_selection: true,
            zoomable: false,
            requires_mean_los: false,
        }
    }
}

/// How a view treats the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRole {
    /// No selection, or the view does not follow it
    Ignore,
    /// The view produced the selection: distinguish selected rows in place
    Highlight,
    /// Another view produced it: keep only selected rows
    Narrow,
}

/// Per-view synchronization settings
#[derive(Debug, Clone)]
pub struct ViewRegistry {
    settings: AHashMap<ViewId, ViewSyncSettings>,
}

impl ViewRegistry {
    /// Empty registry; unregistered views get the default settings
    pub fn new() -> Self {
        Self {
            settings: AHashMap::new(),
        }
    }

    /// The dashboard's views with their standard wiring
    pub fn dashboard(require_mean_los: bool) -> Self {
        let mut registry = Self::new();
        let brushable = ViewSyncSettings {
            can_brush: true,
            requires_mean_los: require_mean_los,
            ..ViewSyncSettings::default()
        };
        registry.register_view(ViewId::TimeSeries, brushable);
        registry.register_view(ViewId::Splom, brushable);
        registry.register_view(
            ViewId::DepartmentComparison,
            ViewSyncSettings {
                requires_mean_los: require_mean_los,
                ..ViewSyncSettings::default()
            },
        );
        registry.register_view(
            ViewId::ParallelCoordinates,
            ViewSyncSettings {
                drives_range: true,
                follows_range: false,
                follows_selection: false,
                ..ViewSyncSettings::default()
            },
        );
        registry.register_view(
            ViewId::Overview,
            ViewSyncSettings {
                drives_range: true,
                follows_range: false,
                follows_selection: false,
                zoomable: true,
                ..ViewSyncSettings::default()
            },
        );
        registry.register_view(
            ViewId::StaffNetwork,
            ViewSyncSettings {
                follows_range: false,
                follows_selection: false,
                ..ViewSyncSettings::default()
            },
        );
        registry
    }

    pub fn register_view(&mut self, view: ViewId, settings: ViewSyncSettings) {
        self.settings.insert(view, settings);
    }

    pub fn unregister_view(&mut self, view: ViewId) {
        self.settings.remove(&view);
    }

    pub fn settings(&self, view: ViewId) -> ViewSyncSettings {
        self.settings.get(&view).copied().unwrap_or_default()
    }

    pub fn can_brush(&self, view: ViewId) -> bool {
        self.settings(view).can_brush
    }

    pub fn drives_range(&self, view: ViewId) -> bool {
        self.settings(view).drives_range
    }

    /// A view never narrows itself by its own selection
    pub fn selection_role(&self, view: ViewId, selection: Option<&Selection>) -> SelectionRole {
        let Some(selection) = selection else {
            return SelectionRole::Ignore;
        };
        if !self.settings(view).follows_selection {
            return SelectionRole::Ignore;
        }
        if selection.source == Some(view) {
            SelectionRole::Highlight
        } else {
            SelectionRole::Narrow
        }
    }
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::dashboard(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{RowKey, Service};

    fn selection_from(source: ViewId) -> Selection {
        Selection {
            source: Some(source),
            keys: [RowKey::new(1, Service::Icu)].into_iter().collect(),
            box_bounds: None,
            epoch: 1,
        }
    }

    #[test]
    fn test_only_brushable_views_can_brush() {
        let registry = ViewRegistry::default();
        assert!(registry.can_brush(ViewId::TimeSeries));
        assert!(registry.can_brush(ViewId::Splom));
        assert!(!registry.can_brush(ViewId::ParallelCoordinates));
        assert!(!registry.can_brush(ViewId::DepartmentComparison));
    }

    #[test]
    fn test_producer_highlights_consumers_narrow() {
        let registry = ViewRegistry::default();
        let selection = selection_from(ViewId::Splom);
        assert_eq!(registry.selection_role(ViewId::Splom, Some(&selection)), SelectionRole::Highlight);
        assert_eq!(registry.selection_role(ViewId::TimeSeries, Some(&selection)), SelectionRole::Narrow);
        assert_eq!(
            registry.selection_role(ViewId::DepartmentComparison, Some(&selection)),
            SelectionRole::Narrow
        );
        assert_eq!(registry.selection_role(ViewId::Overview, Some(&selection)), SelectionRole::Ignore);
        assert_eq!(registry.selection_role(ViewId::TimeSeries, None), SelectionRole::Ignore);
    }

    #[test]
    fn test_unregistered_view_uses_defaults() {
        let mut registry = ViewRegistry::default();
        registry.unregister_view(ViewId::Splom);
        assert!(!registry.can_brush(ViewId::Splom));
        assert_eq!(registry.settings(ViewId::Splom), ViewSyncSettings::default());
    }
}
