//! Renderer abstraction - base trait for the chart views

use std::collections::BTreeSet;

use hd_core::{Hover, Row, RowKey, Selection, SelectionRole, Service, ViewId, WeekRange, ZoomLevel};

use crate::chart::{ChartSpec, Guide};
use crate::plots::utils::colors::WEEK_HIGHLIGHT;

/// Everything a renderer may read. Rows are already filtered for the view
/// but not yet narrowed by the selection.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub rows: &'a [Row],
    pub selection: Option<&'a Selection>,
    pub role: SelectionRole,
    pub range: WeekRange,
    pub zoom: ZoomLevel,
    pub hover: Option<Hover>,
    /// Week picked by a click, highlighted until cleared
    pub selected_week: Option<u32>,
    /// Event weeks get their own markers
    pub show_events: bool,
    /// Departments chosen in the filter; empty means all
    pub departments: &'a BTreeSet<Service>,
}

impl<'a> RenderInput<'a> {
    /// Departments to draw, in display order
    pub fn shown_departments(&self) -> Vec<Service> {
        if self.departments.is_empty() {
            Service::ALL.to_vec()
        } else {
            Service::ALL
                .into_iter()
                .filter(|s| self.departments.contains(s))
                .collect()
        }
    }

    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.selection.is_some_and(|s| s.contains(key))
    }

    /// Band for the clicked week when it lies inside the range
    pub fn selected_week_band(&self) -> Option<Guide> {
        self.selected_week
            .filter(|week| self.range.contains(*week))
            .map(|week| Guide::week_band(week, WEEK_HIGHLIGHT))
    }

    pub fn selection_epoch(&self) -> Option<u64> {
        self.selection.map(|s| s.epoch)
    }

    /// Rows to draw after applying the selection role
    pub fn projected_rows(&self) -> Vec<&'a Row> {
        match (self.role, self.selection) {
            (SelectionRole::Narrow, Some(selection)) => {
                self.rows.iter().filter(|r| selection.contains(&r.key())).collect()
            }
            _ => self.rows.iter().collect(),
        }
    }

    pub fn rows_of(&self, service: Service) -> impl Iterator<Item = &'a Row> + 'a {
        self.rows.iter().filter(move |r| r.service == service)
    }
}

/// Pure figure builder for one view
pub trait ChartRenderer: Send + Sync {
    /// View this renderer draws
    fn view(&self) -> ViewId;

    /// Build the figure
    fn render(&self, input: &RenderInput<'_>) -> ChartSpec;
}
