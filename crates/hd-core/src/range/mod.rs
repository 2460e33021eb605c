//! Week range shared by every week-oriented view

use serde::{Deserialize, Serialize};

use crate::row::{FIRST_WEEK, LAST_WEEK};

mod state;

pub use state::{ControlDisplays, RangeState};

/// Inclusive week window. Always satisfies `1 <= min <= max <= 52`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i64; 2]", into = "[u32; 2]")]
pub struct WeekRange {
    min: u32,
    max: u32,
}

impl WeekRange {
    /// The whole year
    pub const FULL: WeekRange = WeekRange {
        min: FIRST_WEEK,
        max: LAST_WEEK,
    };

    /// Strict constructor: `None` unless the bounds are already valid
    pub fn new(min: u32, max: u32) -> Option<Self> {
        (FIRST_WEEK <= min && min <= max && max <= LAST_WEEK).then_some(Self { min, max })
    }

    /// Order and clamp arbitrary bounds into the valid window
    pub fn clamp(a: i64, b: i64) -> Self {
        let bound = |v: i64| v.clamp(FIRST_WEEK as i64, LAST_WEEK as i64) as u32;
        Self {
            min: bound(a.min(b)),
            max: bound(a.max(b)),
        }
    }

    /// Round fractional bounds (chart zoom payloads) then clamp
    pub fn from_f64(a: f64, b: f64) -> Option<Self> {
        if !a.is_finite() || !b.is_finite() {
            return None;
        }
        Some(Self::clamp(round_week(a), round_week(b)))
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Number of weeks covered
    pub fn span(&self) -> u32 {
        self.max - self.min + 1
    }

    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }

    pub fn contains(&self, week: u32) -> bool {
        self.min <= week && week <= self.max
    }

    pub fn zoom_level(&self) -> ZoomLevel {
        ZoomLevel::for_span(self.span())
    }

    /// Axis bounds padded by half a week on each side
    pub fn axis_bounds(&self) -> [f64; 2] {
        [self.min as f64 - 0.5, self.max as f64 + 0.5]
    }
}

impl Default for WeekRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl From<[i64; 2]> for WeekRange {
    fn from([a, b]: [i64; 2]) -> Self {
        Self::clamp(a, b)
    }
}

impl From<WeekRange> for [u32; 2] {
    fn from(range: WeekRange) -> Self {
        [range.min, range.max]
    }
}

fn round_week(value: f64) -> i64 {
    value
        .round()
        .clamp(i32::MIN as f64, i32::MAX as f64) as i64
}

/// Semantic zoom level derived from the range span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomLevel {
    /// 8 weeks or fewer
    Detail,
    /// 13 weeks or fewer
    Quarter,
    Overview,
}

impl ZoomLevel {
    pub fn for_span(span: u32) -> Self {
        if span <= 8 {
            ZoomLevel::Detail
        } else if span <= 13 {
            ZoomLevel::Quarter
        } else {
            ZoomLevel::Overview
        }
    }

    pub fn indicator(&self, range: WeekRange) -> String {
        let name = match self {
            ZoomLevel::Detail => "Detail",
            ZoomLevel::Quarter => "Quarter",
            ZoomLevel::Overview => "Overview",
        };
        format!("{} (W{}-{})", name, range.min(), range.max())
    }
}

/// Quick-select buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickSelect {
    Q1,
    Q2,
    Q3,
    Q4,
    H1,
    H2,
    Full,
}

impl QuickSelect {
    pub fn range(&self) -> WeekRange {
        let (min, max) = match self {
            QuickSelect::Q1 => (1, 13),
            QuickSelect::Q2 => (14, 26),
            QuickSelect::Q3 => (27, 39),
            QuickSelect::Q4 => (40, 52),
            QuickSelect::H1 => (1, 26),
            QuickSelect::H2 => (27, 52),
            QuickSelect::Full => (FIRST_WEEK, LAST_WEEK),
        };
        WeekRange { min, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_orders_and_bounds() {
        assert_eq!(WeekRange::clamp(60, -4), WeekRange::FULL);
        let r = WeekRange::clamp(30, 10);
        assert_eq!((r.min(), r.max()), (10, 30));
        let r = WeekRange::clamp(55, 53);
        assert_eq!((r.min(), r.max()), (52, 52));
    }

    #[test]
    fn test_from_f64_rounds() {
        let r = WeekRange::from_f64(9.6, 15.4).unwrap();
        assert_eq!((r.min(), r.max()), (10, 15));
        assert!(WeekRange::from_f64(f64::NAN, 3.0).is_none());
    }

    #[test]
    fn test_zoom_levels() {
        assert_eq!(WeekRange::new(1, 8).unwrap().zoom_level(), ZoomLevel::Detail);
        assert_eq!(QuickSelect::Q2.range().zoom_level(), ZoomLevel::Quarter);
        assert_eq!(QuickSelect::H1.range().zoom_level(), ZoomLevel::Overview);
    }

    #[test]
    fn test_serde_clamps_on_read() {
        let r: WeekRange = serde_json::from_str("[40, 0]").unwrap();
        assert_eq!((r.min(), r.max()), (1, 40));
        assert_eq!(serde_json::to_string(&r).unwrap(), "[1,40]");
    }

    #[test]
    fn test_quick_select_table() {
        assert_eq!(QuickSelect::Q4.range(), WeekRange::new(40, 52).unwrap());
        assert!(QuickSelect::Full.range().is_full());
    }
}
