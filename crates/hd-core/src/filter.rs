//! Filter settings and the row source the engine reads through

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::range::WeekRange;
use crate::row::{Row, Service};

/// Weeks flagged by the fixed anomaly calendar: multiples of 3 in [3, 51]
pub fn is_anomaly_week(week: u32) -> bool {
    (3..=51).contains(&week) && week % 3 == 0
}

/// Everything that decides the active row set. Used as a memo key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilterSpec {
    pub range: WeekRange,
    /// Empty means every department
    pub departments: BTreeSet<Service>,
    pub hide_anomalies: bool,
    /// Drop rows without a joined mean length of stay
    pub require_mean_los: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            range: WeekRange::FULL,
            departments: BTreeSet::new(),
            hide_anomalies: false,
            require_mean_los: false,
        }
    }
}

impl FilterSpec {
    pub fn admits(&self, row: &Row) -> bool {
        self.range.contains(row.week)
            && (self.departments.is_empty() || self.departments.contains(&row.service))
            && !(self.hide_anomalies && is_anomaly_week(row.week))
            && !(self.require_mean_los && row.mean_los.is_none())
    }

    /// Range bound, then departments, then anomaly weeks, then LOS presence
    pub fn apply(&self, rows: &[Row]) -> Vec<Row> {
        rows.iter().filter(|row| self.admits(row)).cloned().collect()
    }
}

/// Supplier of filtered rows. Implementations may memoize by spec.
pub trait RowSource: Send + Sync {
    /// Rows this filter admits
    fn active_rows(&self, spec: &FilterSpec) -> Arc<[Row]>;

    /// Every loaded row
    fn all_rows(&self) -> &[Row];

    /// Name of the underlying table
    fn source_name(&self) -> &str;
}

/// Unmemoized in-memory source
#[derive(Debug, Clone)]
pub struct StaticRows {
    name: String,
    rows: Vec<Row>,
}

impl StaticRows {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

impl RowSource for StaticRows {
    fn active_rows(&self, spec: &FilterSpec) -> Arc<[Row]> {
        spec.apply(&self.rows).into()
    }

    fn all_rows(&self) -> &[Row] {
        &self.rows
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
