//! Scatter plot matrix over the efficiency measures

use hd_core::{Dimension, Row, SelectionRole, ViewId};

use super::utils::colors::CONTEXT_GRAY;
use crate::chart::{ChartBody, ChartSpec, DimensionAxis, DragMode, Mark, Series, SeriesRole, TraceMode};
use crate::view::{ChartRenderer, RenderInput};

const TITLE: &str = "Multivariate Efficiency Relationships";

/// Axes of the matrix, in order
pub const SPLOM_DIMENSIONS: [Dimension; 4] = [
    Dimension::PressureIndex,
    Dimension::UtilizationRate,
    Dimension::AcceptanceRate,
    Dimension::MeanLos,
];

/// Marker size encodes bed capacity
fn bed_size(beds: u32, floor: u32, ceiling: u32, offset: u32) -> f64 {
    (beds / 10 + offset).clamp(floor, ceiling) as f64
}

fn mark(row: &Row, color: &str, size: f64) -> Mark {
    let values = SPLOM_DIMENSIONS.iter().map(|d| row.value(*d)).collect();
    let mut mark = Mark::multi(row.key(), values, color).sized(size);
    mark.hover = Some(format!("{} | Week {} | Beds: {}", row.service.as_str(), row.week, row.beds));
    mark
}

#[derive(Debug, Clone, Default)]
pub struct SplomRenderer;

impl ChartRenderer for SplomRenderer {
    fn view(&self) -> ViewId {
        ViewId::Splom
    }

    fn render(&self, input: &RenderInput<'_>) -> ChartSpec {
        let rows = input.projected_rows();
        if rows.is_empty() {
            return ChartSpec::empty(ViewId::Splom, TITLE, "No data for selection");
        }

        let dimensions = SPLOM_DIMENSIONS
            .iter()
            .map(|d| DimensionAxis {
                range: None,
                ..DimensionAxis::new(*d, d.label())
            })
            .collect();

        let mut series = Vec::new();
        if input.role == SelectionRole::Highlight {
            let mut context = Series::new("All points", TraceMode::Markers, CONTEXT_GRAY);
            context.role = SeriesRole::Context;
            context.opacity = 0.12;
            context.show_legend = false;
            context.marks = rows.iter().map(|r| mark(r, CONTEXT_GRAY, 3.0)).collect();
            series.push(context);

            let selected: Vec<Mark> = rows
                .iter()
                .filter(|r| input.is_selected(&r.key()))
                .map(|r| mark(r, r.service.color(), bed_size(r.beds, 6, 12, 5)))
                .collect();
            if !selected.is_empty() {
                let mut highlight = Series::new("Selected", TraceMode::Markers, CONTEXT_GRAY);
                highlight.role = SeriesRole::Selected;
                highlight.opacity = 0.95;
                highlight.show_legend = false;
                highlight.marks = selected;
                series.push(highlight);
            }
        } else {
            let mut points = Series::new("Weeks", TraceMode::Markers, CONTEXT_GRAY);
            points.opacity = 0.7;
            points.show_legend = false;
            points.marks = rows
                .iter()
                .map(|r| mark(r, r.service.color(), bed_size(r.beds, 4, 10, 4)))
                .collect();
            series.push(points);
        }

        let mut spec = ChartSpec::new(ViewId::Splom, TITLE, ChartBody::Matrix { dimensions, series })
            .with_subtitle("Brush to filter time series. Marker size = bed capacity")
            .with_drag_mode(DragMode::Select);
        spec.selection_epoch = input.selection_epoch();
        spec
    }
}
