//! Satisfaction and acceptance over the year, zoomed to the week range

use hd_core::{Row, ViewId, ZoomLevel};

use super::utils::colors::HOVER_DEFAULT;
use super::utils::{mean, std_dev};
use crate::chart::{Axis, ChartBody, ChartSpec, DragMode, Guide, Mark, Panel, Series, TraceMode};
use crate::view::{ChartRenderer, RenderInput};

const TITLE: &str = "Department Overview";
const REFERENCE_GRAY: &str = "#666666";

/// Marker size and line width for a zoom level
fn styling(zoom: ZoomLevel) -> (f64, f64) {
    match zoom {
        ZoomLevel::Overview => (5.0, 2.0),
        ZoomLevel::Quarter => (8.0, 2.5),
        ZoomLevel::Detail => (10.0, 2.5),
    }
}

struct Metric {
    title: &'static str,
    hover_label: &'static str,
    value: fn(&Row) -> f64,
}

fn satisfaction(row: &Row) -> f64 {
    row.satisfaction
}

fn acceptance(row: &Row) -> f64 {
    row.acceptance_rate
}

const METRICS: [Metric; 2] = [
    Metric {
        title: "Satisfaction",
        hover_label: "Satisfaction",
        value: satisfaction,
    },
    Metric {
        title: "Acceptance %",
        hover_label: "Acceptance",
        value: acceptance,
    },
];

/// Mean line per shown department; one department also gets its 2σ band
fn reference_lines(input: &RenderInput<'_>, metric: &Metric) -> Vec<Guide> {
    let shown = input.shown_departments();
    if shown.len() > 2 {
        return Vec::new();
    }
    let mut guides = Vec::new();
    for service in &shown {
        let values: Vec<f64> = input.rows_of(*service).map(metric.value).collect();
        let Some(avg) = mean(values.iter().copied()) else {
            continue;
        };
        guides.push(Guide::labelled(avg, service.color(), format!("μ={avg:.0}")));
        if shown.len() == 1 {
            if let Some(sd) = std_dev(&values) {
                guides.push(Guide::labelled((avg + 2.0 * sd).min(100.0), REFERENCE_GRAY, "+2σ"));
                guides.push(Guide::labelled((avg - 2.0 * sd).max(0.0), REFERENCE_GRAY, "-2σ"));
            }
        }
    }
    guides
}

#[derive(Debug, Clone, Default)]
pub struct OverviewRenderer;

impl ChartRenderer for OverviewRenderer {
    fn view(&self) -> ViewId {
        ViewId::Overview
    }

    fn render(&self, input: &RenderInput<'_>) -> ChartSpec {
        if input.rows.is_empty() {
            return ChartSpec::empty(ViewId::Overview, TITLE, "No data for selected filters");
        }
        let (marker_size, line_width) = styling(input.zoom);
        let hover_guide = input.hover.map(|hover| {
            let color = hover.service.map_or(HOVER_DEFAULT, |s| s.color());
            Guide::vertical(hover.week as f64, color)
        });

        let panels = METRICS
            .iter()
            .map(|metric| {
                let series = input
                    .shown_departments()
                    .into_iter()
                    .filter_map(|service| {
                        let mut rows: Vec<&Row> = input.rows_of(service).collect();
                        if rows.is_empty() {
                            return None;
                        }
                        rows.sort_by_key(|r| r.week);
                        let mut series = Series::for_service(service, TraceMode::LinesMarkers);
                        series.line_width = Some(line_width);
                        series.marks = rows
                            .iter()
                            .map(|r| {
                                let y = (metric.value)(r);
                                let mut mark = Mark::at(r.key(), r.week as f64, y, service.color()).sized(marker_size);
                                mark.hover = Some(format!(
                                    "{} | Week {} | {}: {:.1}",
                                    service.short_label(),
                                    r.week,
                                    metric.hover_label,
                                    y
                                ));
                                mark
                            })
                            .collect();
                        Some(series)
                    })
                    .collect();

                let mut guides = reference_lines(input, metric);
                guides.extend(input.selected_week_band());
                guides.extend(hover_guide.clone());
                Panel {
                    y_axis: Axis::new(metric.title).with_range([0.0, 105.0]),
                    series,
                    guides,
                }
            })
            .collect();

        let tick_step = if input.zoom == ZoomLevel::Detail { 1.0 } else { 4.0 };
        ChartSpec::new(
            ViewId::Overview,
            TITLE,
            ChartBody::Cartesian {
                x_axis: Axis::new("Week")
                    .with_range(input.range.axis_bounds())
                    .with_ticks(tick_step),
                panels,
            },
        )
        .with_subtitle(input.zoom.indicator(input.range))
        .with_drag_mode(DragMode::Zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plots::test_support::{input, rows};
    use crate::plots::utils::colors::WEEK_HIGHLIGHT;
    use hd_core::{Hover, SelectionRole, Service, WeekRange};

    fn cartesian(spec: &ChartSpec) -> (&Axis, &[Panel]) {
        match &spec.body {
            ChartBody::Cartesian { x_axis, panels } => (x_axis, panels.as_slice()),
            other => panic!("expected cartesian body, got {other:?}"),
        }
    }

    #[test]
    fn test_two_panels_over_the_range() {
        let rows = rows();
        let departments = Default::default();
        let mut input = input(&rows, None, SelectionRole::Ignore, &departments);
        input.range = WeekRange::new(10, 15).unwrap();
        input.zoom = input.range.zoom_level();
        let spec = OverviewRenderer.render(&input);
        let (x_axis, panels) = cartesian(&spec);
        assert_eq!(x_axis.range, Some([9.5, 15.5]));
        assert_eq!(x_axis.tick_step, Some(1.0));
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[1].y_axis.title, "Acceptance %");
        let first = &panels[0].series[0];
        assert_eq!(first.marks.len(), 52);
        assert_eq!(first.marks[0].size, 10.0);
        assert!(panels[0].guides.is_empty());
        assert_eq!(spec.drag_mode, DragMode::Zoom);
    }

    #[test]
    fn test_single_department_gets_mean_and_band() {
        let rows = rows();
        let departments = [Service::Icu].into_iter().collect();
        let icu: Vec<_> = rows.iter().filter(|r| r.service == Service::Icu).cloned().collect();
        let spec = OverviewRenderer.render(&input(&icu, None, SelectionRole::Ignore, &departments));
        let (_, panels) = cartesian(&spec);
        assert_eq!(panels[0].guides.len(), 3);
    }

    #[test]
    fn test_clicked_week_is_shaded_inside_the_range() {
        let rows = rows();
        let departments = Default::default();
        let mut input = input(&rows, None, SelectionRole::Ignore, &departments);
        input.selected_week = Some(30);
        let spec = OverviewRenderer.render(&input);
        let (_, panels) = cartesian(&spec);
        assert!(panels.iter().all(|p| p.guides == vec![Guide::week_band(30, WEEK_HIGHLIGHT)]));

        input.range = WeekRange::new(1, 13).unwrap();
        let spec = OverviewRenderer.render(&input);
        let (_, panels) = cartesian(&spec);
        assert!(panels[0].guides.is_empty());
    }

    #[test]
    fn test_hover_draws_a_week_marker() {
        let rows = rows();
        let departments = Default::default();
        let mut input = input(&rows, None, SelectionRole::Ignore, &departments);
        input.hover = Some(Hover {
            view: ViewId::Overview,
            week: 20,
            service: Some(Service::Surgery),
        });
        let spec = OverviewRenderer.render(&input);
        let (_, panels) = cartesian(&spec);
        assert!(panels
            .iter()
            .all(|p| p.guides.contains(&Guide::vertical(20.0, Service::Surgery.color()))));
    }
}
