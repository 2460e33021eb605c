//! Capacity pressure over time, one line per department

use hd_core::{Row, SelectionRole, ViewId};

use super::utils::colors::{event_color, GUIDE};
use super::utils::{extent, max_finite};
use crate::chart::{Axis, ChartBody, ChartSpec, DragMode, Guide, Mark, Panel, Series, SeriesRole, Symbol, TraceMode};
use crate::view::{ChartRenderer, RenderInput};

const TITLE: &str = "Capacity Pressure Over Time";

/// Pressure index per department. Brushes select `(week, pressure)` boxes.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesRenderer;

fn hover_text(row: &Row) -> String {
    format!(
        "{} | Week {} | Pressure: {:.2} | Beds: {} | Event: {}",
        row.service.as_str(),
        row.week,
        row.pressure_index,
        row.beds,
        row.event.as_str()
    )
}

fn point(row: &Row, narrowed: bool, show_events: bool) -> Mark {
    let mut mark = Mark::at(row.key(), row.week as f64, row.pressure_index, row.service.color());
    match event_color(row.event).filter(|_| show_events) {
        Some(color) => {
            mark.symbol = Symbol::Diamond;
            mark.color = color.to_string();
            mark.size = if narrowed { 9.0 } else { 7.0 };
        }
        None => mark.size = if narrowed { 8.0 } else { 5.0 },
    }
    mark.hover = Some(hover_text(row));
    mark
}

impl ChartRenderer for TimeSeriesRenderer {
    fn view(&self) -> ViewId {
        ViewId::TimeSeries
    }

    fn render(&self, input: &RenderInput<'_>) -> ChartSpec {
        let narrowed = input.role == SelectionRole::Narrow;
        let highlighting = input.role == SelectionRole::Highlight;
        let rows = input.projected_rows();
        if rows.is_empty() {
            return ChartSpec::empty(ViewId::TimeSeries, TITLE, "No data for selection");
        }

        let mut series = Vec::new();
        for service in input.shown_departments() {
            let mut dept_rows: Vec<&Row> = rows.iter().copied().filter(|r| r.service == service).collect();
            if dept_rows.is_empty() {
                continue;
            }
            dept_rows.sort_by_key(|r| r.week);

            let mode = if narrowed { TraceMode::Markers } else { TraceMode::LinesMarkers };
            let mut base = Series::for_service(service, mode);
            base.line_width = (!narrowed).then_some(2.0);
            base.opacity = if highlighting { 0.15 } else { 1.0 };
            base.marks = dept_rows
                .iter()
                .map(|r| point(r, narrowed, input.show_events))
                .collect();
            series.push(base);

            if highlighting {
                let selected: Vec<Mark> = dept_rows
                    .iter()
                    .filter(|r| input.is_selected(&r.key()))
                    .map(|r| {
                        let mut mark = Mark::at(r.key(), r.week as f64, r.pressure_index, service.color()).sized(12.0);
                        mark.hover = Some(hover_text(r));
                        mark
                    })
                    .collect();
                if !selected.is_empty() {
                    let mut highlight = Series::for_service(service, TraceMode::Markers);
                    highlight.name = format!("{} selected", service.label());
                    highlight.role = SeriesRole::Selected;
                    highlight.show_legend = false;
                    highlight.marks = selected;
                    series.push(highlight);
                }
            }
        }

        let (week_min, week_max) = extent(rows.iter().map(|r| r.week as f64)).unwrap_or((1.0, 52.0));
        let pad = if narrowed { 1.0 } else { 0.5 };
        let y_max = max_finite(rows.iter().map(|r| r.pressure_index * 1.1))
            .unwrap_or(0.0)
            .max(1.5);

        let subtitle = if narrowed {
            format!("Filtered: {} points from multivariate selection", rows.len())
        } else if input.show_events {
            "Select points to brush multivariate view. Diamonds = events".to_string()
        } else {
            "Select points to brush multivariate view".to_string()
        };
        let mut guides = vec![Guide::horizontal(1.0, GUIDE)];
        guides.extend(input.selected_week_band());

        let mut spec = ChartSpec::new(
            ViewId::TimeSeries,
            TITLE,
            ChartBody::Cartesian {
                x_axis: Axis::new("Week")
                    .with_range([week_min - pad, week_max + pad])
                    .with_ticks(4.0),
                panels: vec![Panel {
                    y_axis: Axis::new("Pressure Index (Demand / Beds)").with_range([0.0, y_max]),
                    series,
                    guides,
                }],
            },
        )
        .with_subtitle(subtitle)
        .with_drag_mode(DragMode::Select);
        spec.selection_epoch = input.selection_epoch();
        spec
    }
}
