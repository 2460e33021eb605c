//! Range transitions for the controls that can move the week window

use serde::Serialize;

use super::{QuickSelect, WeekRange};
use crate::row::{FIRST_WEEK, LAST_WEEK};

/// A constraint at least this wide is read as "cleared"
const FULL_CONSTRAINT_SPAN: u32 = 51;

/// Current week window. Every transition returns whether the window moved,
/// so that an event landing on the current range does not trigger a re-derive.
#[derive(Debug, Clone, Default)]
pub struct RangeState {
    current: WeekRange,
}

impl RangeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> WeekRange {
        self.current
    }

    /// Slider drag; bounds are clamped and ordered
    pub fn apply_slider(&mut self, a: i64, b: i64) -> bool {
        self.set(WeekRange::clamp(a, b))
    }

    /// Start/end number inputs. A missing start means week 1, a missing end week 52.
    pub fn apply_inputs(&mut self, start: Option<i64>, end: Option<i64>) -> bool {
        let start = start.unwrap_or(FIRST_WEEK as i64);
        let end = end.unwrap_or(LAST_WEEK as i64);
        self.set(WeekRange::clamp(start, end))
    }

    /// Chart x-axis zoom. Ignored when the rounded window collapses to one week.
    pub fn apply_zoom(&mut self, x0: f64, x1: f64) -> bool {
        match WeekRange::from_f64(x0, x1) {
            Some(range) if range.min() < range.max() => self.set(range),
            _ => false,
        }
    }

    /// Double-click or autorange on a zoomable view
    pub fn apply_autorange(&mut self) -> bool {
        self.set(WeekRange::FULL)
    }

    /// Week-axis constraint edit on the parallel coordinates plot.
    /// `None` means the constraint was removed; a constraint inside one week is ignored.
    pub fn apply_constraint(&mut self, bounds: Option<(f64, f64)>) -> bool {
        let Some((a, b)) = bounds else {
            return self.set(WeekRange::FULL);
        };
        let Some(range) = WeekRange::from_f64(a, b) else {
            return false;
        };
        let nearly_full = range.span() >= FULL_CONSTRAINT_SPAN
            || (range.min() <= FIRST_WEEK + 1 && range.max() >= LAST_WEEK - 1);
        if nearly_full {
            self.set(WeekRange::FULL)
        } else if range.min() < range.max() {
            self.set(range)
        } else {
            false
        }
    }

    pub fn apply_preset(&mut self, preset: QuickSelect) -> bool {
        self.set(preset.range())
    }

    pub fn reset(&mut self) -> bool {
        self.set(WeekRange::FULL)
    }

    fn set(&mut self, range: WeekRange) -> bool {
        if self.current == range {
            return false;
        }
        self.current = range;
        true
    }
}

/// What each range control shows. Derived one-way from the range and never
/// fed back into a transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlDisplays {
    pub slider: [u32; 2],
    pub chart_axis: [f64; 2],
    pub pcp_constraint: Option<[u32; 2]>,
}

impl From<WeekRange> for ControlDisplays {
    fn from(range: WeekRange) -> Self {
        Self {
            slider: range.into(),
            chart_axis: range.axis_bounds(),
            pcp_constraint: (!range.is_full()).then(|| range.into()),
        }
    }
}
