//! Default renderers for the dashboard views

// Linked brushing pair
pub mod time_series;
pub mod splom;

// Follows the brushing pair
pub mod department_comparison;

// Range-driven views
pub mod parallel_coordinates;
pub mod overview;

// Staff
pub mod network;

// Utilities
pub mod utils;

// Re-exports
pub use department_comparison::{department_stats, DepartmentComparisonRenderer, DepartmentStats};
pub use network::{snap_week, StaffNetwork, TeamStatus};
pub use overview::OverviewRenderer;
pub use parallel_coordinates::{ParallelCoordinatesRenderer, PCP_DIMENSIONS};
pub use splom::{SplomRenderer, SPLOM_DIMENSIONS};
pub use time_series::TimeSeriesRenderer;

use crate::view::ChartRenderer;

/// One renderer per chart view
pub fn default_renderers() -> Vec<Box<dyn ChartRenderer>> {
    vec![
        Box::new(TimeSeriesRenderer),
        Box::new(SplomRenderer),
        Box::new(DepartmentComparisonRenderer),
        Box::new(ParallelCoordinatesRenderer),
        Box::new(OverviewRenderer),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeSet;

    use hd_core::{
        Row, RowKey, Selection, SelectionRole, Service, WeekEvent, WeekRange, FIRST_WEEK, LAST_WEEK,
    };

    use crate::view::RenderInput;

    pub fn row(week: u32, service: Service) -> Row {
        let beds = 30 + service as u32 * 10;
        let demand = beds - 5 + week % 10;
        let admitted = demand.min(beds);
        Row {
            week,
            service,
            event: WeekEvent::None,
            beds,
            demand,
            admitted,
            refused: demand - admitted,
            satisfaction: 70.0 + (week % 10) as f64,
            morale: 60.0 + (week % 7) as f64,
            pressure_index: (demand as f64 / beds as f64 * 100.0).round() / 100.0,
            acceptance_rate: (admitted as f64 / demand as f64 * 1000.0).round() / 10.0,
            refusal_rate: ((demand - admitted) as f64 / demand as f64 * 1000.0).round() / 10.0,
            utilization_rate: (admitted as f64 / beds as f64 * 1000.0).round() / 10.0,
            mean_los: Some(3.0 + (week % 4) as f64),
        }
    }

    /// Every service for every week, ordered by service then week
    pub fn rows() -> Vec<Row> {
        Service::ALL
            .into_iter()
            .flat_map(|service| (FIRST_WEEK..=LAST_WEEK).map(move |week| row(week, service)))
            .collect()
    }

    pub fn selection_of(source: hd_core::ViewId, keys: &[(u32, Service)]) -> Selection {
        Selection {
            source: Some(source),
            keys: keys.iter().map(|(w, s)| RowKey::new(*w, *s)).collect(),
            box_bounds: None,
            epoch: 1,
        }
    }

    pub fn input<'a>(
        rows: &'a [Row],
        selection: Option<&'a Selection>,
        role: SelectionRole,
        departments: &'a BTreeSet<Service>,
    ) -> RenderInput<'a> {
        RenderInput {
            rows,
            selection,
            role,
            range: WeekRange::FULL,
            zoom: WeekRange::FULL.zoom_level(),
            hover: None,
            selected_week: None,
            show_events: true,
            departments,
        }
    }
}
