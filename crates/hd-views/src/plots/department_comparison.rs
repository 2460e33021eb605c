//! Net capacity (beds minus demand) per department

use std::collections::BTreeSet;

use hd_core::{Row, SelectionRole, Service, ViewId};

use super::utils::colors::{GUIDE, OVERLOAD, SLACK};
use super::utils::mean;
use crate::chart::{Axis, Bar, ChartBody, ChartSpec, Guide};
use crate::view::{ChartRenderer, RenderInput};

const TITLE: &str = "Slack vs Overload by Department";

/// Per-department means over the rows shown
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentStats {
    pub service: Service,
    pub avg_beds: f64,
    pub avg_demand: f64,
    /// Mean of beds minus demand; negative means overload
    pub avg_net_capacity: f64,
    pub avg_admitted: f64,
    pub avg_pressure: f64,
    pub avg_acceptance: f64,
}

impl DepartmentStats {
    fn from_rows(service: Service, rows: &[&Row]) -> Option<Self> {
        let avg = |f: fn(&Row) -> f64| mean(rows.iter().map(|r| f(r)));
        Some(Self {
            service,
            avg_beds: avg(|r| r.beds as f64)?,
            avg_demand: avg(|r| r.demand as f64)?,
            avg_net_capacity: avg(Row::net_capacity)?,
            avg_admitted: avg(|r| r.admitted as f64)?,
            avg_pressure: avg(|r| r.pressure_index)?,
            avg_acceptance: avg(|r| r.acceptance_rate)?,
        })
    }

    pub fn net_capacity(&self) -> f64 {
        self.avg_net_capacity
    }

    /// Admitted over beds as a percentage; 0 without beds
    pub fn utilization(&self) -> f64 {
        if self.avg_beds == 0.0 {
            0.0
        } else {
            self.avg_admitted / self.avg_beds * 100.0
        }
    }
}

/// Stats for each department present, sorted by net capacity descending
pub fn department_stats(rows: &[&Row]) -> Vec<DepartmentStats> {
    let mut stats: Vec<DepartmentStats> = Service::ALL
        .into_iter()
        .filter_map(|service| {
            let group: Vec<&Row> = rows.iter().copied().filter(|r| r.service == service).collect();
            DepartmentStats::from_rows(service, &group)
        })
        .collect();
    stats.sort_by(|a, b| b.net_capacity().total_cmp(&a.net_capacity()));
    stats
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentComparisonRenderer;

impl ChartRenderer for DepartmentComparisonRenderer {
    fn view(&self) -> ViewId {
        ViewId::DepartmentComparison
    }

    fn render(&self, input: &RenderInput<'_>) -> ChartSpec {
        if input.rows.is_empty() {
            return ChartSpec::empty(ViewId::DepartmentComparison, TITLE, "No data");
        }
        let rows = input.projected_rows();
        if rows.is_empty() {
            return ChartSpec::empty(ViewId::DepartmentComparison, TITLE, "No data for selected points");
        }

        let selected: BTreeSet<Service> = match (input.role, input.selection) {
            (SelectionRole::Ignore, _) | (_, None) => BTreeSet::new(),
            (_, Some(selection)) => selection.keys.iter().map(|k| k.service).collect(),
        };

        let bars = department_stats(&rows)
            .into_iter()
            .map(|stats| {
                let net = stats.net_capacity();
                let color = if selected.contains(&stats.service) {
                    stats.service.color()
                } else if net >= 0.0 {
                    SLACK
                } else {
                    OVERLOAD
                };
                Bar {
                    label: stats.service.label().to_string(),
                    service: stats.service,
                    value: net,
                    color: color.to_string(),
                    details: vec![
                        ("Avg Beds".to_string(), stats.avg_beds),
                        ("Avg Demand".to_string(), stats.avg_demand),
                        ("Utilization".to_string(), stats.utilization()),
                        ("Pressure".to_string(), stats.avg_pressure),
                        ("Acceptance".to_string(), stats.avg_acceptance),
                    ],
                }
            })
            .collect();

        let mut spec = ChartSpec::new(
            ViewId::DepartmentComparison,
            TITLE,
            ChartBody::Bars {
                x_axis: Axis::new("Department"),
                y_axis: Axis::new("Net capacity (Beds - Demand)"),
                bars,
                guides: vec![Guide::horizontal(0.0, GUIDE)],
            },
        )
        .with_subtitle("Net capacity = Beds - Demand. Green = slack, red = overload.");
        spec.selection_epoch = input.selection_epoch();
        spec
    }
}
