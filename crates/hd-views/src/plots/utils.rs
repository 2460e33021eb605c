//! Utilities for plot views

pub mod colors;
pub mod stats;

// Re-export commonly used items
pub use colors::event_color;
pub use stats::{extent, max_finite, mean, std_dev};
