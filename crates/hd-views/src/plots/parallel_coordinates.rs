//! Parallel coordinates over the whole year with the week range as focus

use hd_core::{Dimension, Row, ViewId};

use super::utils::colors::CONTEXT_GRAY;
use crate::chart::{ChartBody, ChartSpec, DimensionAxis, DragMode, Mark, Series, SeriesRole, TraceMode};
use crate::view::{ChartRenderer, RenderInput};

const TITLE: &str = "Weekly Profile by Department";

/// Axes left to right; the week axis carries the range constraint
pub const PCP_DIMENSIONS: [(Dimension, &str); 8] = [
    (Dimension::Week, "Week"),
    (Dimension::Beds, "Beds"),
    (Dimension::Demand, "Requests"),
    (Dimension::Admitted, "Admitted"),
    (Dimension::Refused, "Refused"),
    (Dimension::AcceptanceRate, "Accept %"),
    (Dimension::Satisfaction, "Satisfaction"),
    (Dimension::Morale, "Morale"),
];

fn line(row: &Row, color: &str) -> Mark {
    let values = PCP_DIMENSIONS.iter().map(|(d, _)| row.value(*d)).collect();
    Mark::multi(row.key(), values, color)
}

#[derive(Debug, Clone, Default)]
pub struct ParallelCoordinatesRenderer;

impl ChartRenderer for ParallelCoordinatesRenderer {
    fn view(&self) -> ViewId {
        ViewId::ParallelCoordinates
    }

    fn render(&self, input: &RenderInput<'_>) -> ChartSpec {
        if input.rows.is_empty() {
            return ChartSpec::empty(ViewId::ParallelCoordinates, TITLE, "No data for selected filters");
        }

        let constraint = (!input.range.is_full()).then(|| [input.range.min() as f64, input.range.max() as f64]);
        let dimensions = PCP_DIMENSIONS
            .iter()
            .map(|(dimension, label)| {
                let mut axis = DimensionAxis::new(*dimension, label);
                if *dimension == Dimension::Week {
                    axis.constraint = constraint;
                }
                axis
            })
            .collect();

        let mut series = Vec::new();
        let mut context = Series::new("Outside range", TraceMode::Lines, CONTEXT_GRAY);
        context.role = SeriesRole::Context;
        context.show_legend = false;
        for service in input.shown_departments() {
            let mut focus = Series::for_service(service, TraceMode::Lines);
            for row in input.rows_of(service) {
                if input.range.contains(row.week) {
                    focus.marks.push(line(row, service.color()));
                } else {
                    context.marks.push(line(row, CONTEXT_GRAY));
                }
            }
            if !focus.marks.is_empty() {
                series.push(focus);
            }
        }
        if !context.marks.is_empty() {
            series.insert(0, context);
        }

        ChartSpec::new(ViewId::ParallelCoordinates, TITLE, ChartBody::Parallel { dimensions, series })
            .with_subtitle("Drag on the Week axis to set the week range")
            .with_drag_mode(DragMode::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plots::test_support::{input, rows};
    use hd_core::{SelectionRole, Service, WeekRange};

    fn week_axis(spec: &ChartSpec) -> &DimensionAxis {
        match &spec.body {
            ChartBody::Parallel { dimensions, .. } => &dimensions[0],
            other => panic!("expected parallel body, got {other:?}"),
        }
    }

    #[test]
    fn test_full_range_has_no_constraint() {
        let rows = rows();
        let departments = Default::default();
        let spec = ParallelCoordinatesRenderer.render(&input(&rows, None, SelectionRole::Ignore, &departments));
        let axis = week_axis(&spec);
        assert_eq!(axis.range, Some([1.0, 52.0]));
        assert_eq!(axis.constraint, None);
        assert!(spec.series().iter().all(|s| s.role == SeriesRole::Base));
    }

    #[test]
    fn test_range_is_focus_rest_is_context() {
        let rows = rows();
        let departments = [Service::Surgery].into_iter().collect();
        let filtered: Vec<_> = rows.iter().filter(|r| r.service == Service::Surgery).cloned().collect();
        let mut input = input(&filtered, None, SelectionRole::Ignore, &departments);
        input.range = WeekRange::new(5, 50).unwrap();
        let spec = ParallelCoordinatesRenderer.render(&input);
        assert_eq!(week_axis(&spec).constraint, Some([5.0, 50.0]));
        let series = spec.series();
        assert_eq!(series[0].role, SeriesRole::Context);
        assert_eq!(series[0].marks.len(), 6);
        assert_eq!(series[1].marks.len(), 46);
        assert_eq!(series[1].marks[0].values.len(), PCP_DIMENSIONS.len());
    }

    #[test]
    fn test_no_rows_message() {
        let departments = Default::default();
        let spec = ParallelCoordinatesRenderer.render(&input(&[], None, SelectionRole::Ignore, &departments));
        assert!(spec.is_empty());
    }
}
