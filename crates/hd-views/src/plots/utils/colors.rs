//! Color utilities for plots

use hd_core::WeekEvent;

/// Muted color for context and unselected marks
pub const CONTEXT_GRAY: &str = "#d0d0d0";

/// Net capacity at or above zero
pub const SLACK: &str = "#27ae60";

/// Net capacity below zero
pub const OVERLOAD: &str = "#e74c3c";

/// Neutral reference lines
pub const GUIDE: &str = "#7f8c8d";

/// Hover line when no department is hovered
pub const HOVER_DEFAULT: &str = "#3498db";

/// Shading behind a clicked week
pub const WEEK_HIGHLIGHT: &str = "rgba(52,152,219,0.18)";

/// Marker color for event weeks; `None` for ordinary weeks
pub fn event_color(event: WeekEvent) -> Option<&'static str> {
    match event {
        WeekEvent::Flu => Some("#D55E00"),
        WeekEvent::Strike => Some("#CC79A7"),
        WeekEvent::Donation => Some("#009E73"),
        WeekEvent::None => None,
    }
}
