//! Canonical events consumed by the synchronization engine
//!
//! View adapters translate raw interaction payloads into these tagged events;
//! the engine pattern-matches on the variant and never inspects raw shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::range::QuickSelect;
use crate::row::{RowKey, Service};
use crate::selection::{BoxBounds, Span};

/// Visual surfaces of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViewId {
    #[serde(rename = "efficiency-timeseries")]
    TimeSeries,
    #[serde(rename = "multivariate-splom")]
    Splom,
    #[serde(rename = "department-comparison")]
    DepartmentComparison,
    #[serde(rename = "pcp-chart")]
    ParallelCoordinates,
    #[serde(rename = "overview-chart")]
    Overview,
    #[serde(rename = "staff-network")]
    StaffNetwork,
}

impl ViewId {
    pub const ALL: [ViewId; 6] = [
        ViewId::TimeSeries,
        ViewId::Splom,
        ViewId::DepartmentComparison,
        ViewId::ParallelCoordinates,
        ViewId::Overview,
        ViewId::StaffNetwork,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewId::TimeSeries => "efficiency-timeseries",
            ViewId::Splom => "multivariate-splom",
            ViewId::DepartmentComparison => "department-comparison",
            ViewId::ParallelCoordinates => "pcp-chart",
            ViewId::Overview => "overview-chart",
            ViewId::StaffNetwork => "staff-network",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ViewId::TimeSeries => "time series",
            ViewId::Splom => "multivariate view",
            ViewId::DepartmentComparison => "department comparison",
            ViewId::ParallelCoordinates => "parallel coordinates",
            ViewId::Overview => "overview",
            ViewId::StaffNetwork => "staff network",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user interaction, already normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SyncEvent {
    /// Week slider dragged
    SliderChanged { min: i64, max: i64 },
    /// Start/end number inputs edited
    WeekInputsChanged { start: Option<i64>, end: Option<i64> },
    /// Quarter/half/reset buttons
    QuickSelect { preset: QuickSelect },
    /// x-axis zoom or pan on a chart
    ChartZoomed { view: ViewId, x0: f64, x1: f64 },
    /// Double-click on a chart
    Autorange { view: ViewId },
    /// Week-axis constraint on the parallel coordinates plot; `None` when removed
    PcpConstraint { span: Option<Span> },
    /// Rows chosen by a brush-capable view
    Brushed {
        view: ViewId,
        keys: Vec<RowKey>,
        box_bounds: Option<BoxBounds>,
    },
    /// Existing brush box dragged to new bounds
    BoxMoved {
        view: ViewId,
        bounds: BoxBounds,
        epoch: Option<u64>,
    },
    ClearSelection,
    /// Global reset of range, selections, departments and hover
    Reset,
    DepartmentsChanged { services: Vec<Service> },
    SelectAllDepartments,
    HideAnomaliesChanged { hide: bool },
    Hovered {
        view: ViewId,
        week: i64,
        service: Option<Service>,
    },
    HoverCleared,
    /// Click on a point of a week axis; the x value is already rounded
    WeekClicked { view: ViewId, week: i64 },
    ClearWeekSelection,
    /// Event-week markers on or off
    ShowEventsChanged { show: bool },
}

impl SyncEvent {
    /// View that emitted the event, when it came from one
    pub fn source(&self) -> Option<ViewId> {
        match self {
            SyncEvent::ChartZoomed { view, .. }
            | SyncEvent::Autorange { view }
            | SyncEvent::Brushed { view, .. }
            | SyncEvent::BoxMoved { view, .. }
            | SyncEvent::Hovered { view, .. }
            | SyncEvent::WeekClicked { view, .. } => Some(*view),
            SyncEvent::PcpConstraint { .. } => Some(ViewId::ParallelCoordinates),
            _ => None,
        }
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            SyncEvent::SliderChanged { .. } => "slider_changed",
            SyncEvent::WeekInputsChanged { .. } => "week_inputs_changed",
            SyncEvent::QuickSelect { .. } => "quick_select",
            SyncEvent::ChartZoomed { .. } => "chart_zoomed",
            SyncEvent::Autorange { .. } => "autorange",
            SyncEvent::PcpConstraint { .. } => "pcp_constraint",
            SyncEvent::Brushed { .. } => "brushed",
            SyncEvent::BoxMoved { .. } => "box_moved",
            SyncEvent::ClearSelection => "clear_selection",
            SyncEvent::Reset => "reset",
            SyncEvent::DepartmentsChanged { .. } => "departments_changed",
            SyncEvent::SelectAllDepartments => "select_all_departments",
            SyncEvent::HideAnomaliesChanged { .. } => "hide_anomalies_changed",
            SyncEvent::Hovered { .. } => "hovered",
            SyncEvent::HoverCleared => "hover_cleared",
            SyncEvent::WeekClicked { .. } => "week_clicked",
            SyncEvent::ClearWeekSelection => "clear_week_selection",
            SyncEvent::ShowEventsChanged { .. } => "show_events_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_read_from_tagged_json() {
        let event: SyncEvent =
            serde_json::from_str(r#"{"type":"slider_changed","payload":{"min":5,"max":12}}"#).unwrap();
        assert_eq!(event, SyncEvent::SliderChanged { min: 5, max: 12 });

        let event: SyncEvent = serde_json::from_str(r#"{"type":"reset"}"#).unwrap();
        assert_eq!(event, SyncEvent::Reset);

        let event: SyncEvent = serde_json::from_str(
            r#"{"type":"autorange","payload":{"view":"efficiency-timeseries"}}"#,
        )
        .unwrap();
        assert_eq!(event.source(), Some(ViewId::TimeSeries));
    }

    #[test]
    fn test_constraint_events_come_from_pcp() {
        let event = SyncEvent::PcpConstraint { span: None };
        assert_eq!(event.source(), Some(ViewId::ParallelCoordinates));
        assert_eq!(event.kind(), "pcp_constraint");
    }

    #[test]
    fn test_week_click_reads_from_json() {
        let event: SyncEvent = serde_json::from_str(
            r#"{"type":"week_clicked","payload":{"view":"efficiency-timeseries","week":14}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            SyncEvent::WeekClicked {
                view: ViewId::TimeSeries,
                week: 14
            }
        );
        assert_eq!(event.source(), Some(ViewId::TimeSeries));

        let event: SyncEvent = serde_json::from_str(r#"{"type":"clear_week_selection"}"#).unwrap();
        assert_eq!(event.kind(), "clear_week_selection");
        assert_eq!(event.source(), None);
    }
}
