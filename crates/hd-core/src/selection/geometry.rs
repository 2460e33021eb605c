//! Axis-aligned hit testing in data coordinates

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::row::{Dimension, Row, RowKey};

/// Closed interval with normalized bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    /// Build from two ends in either order. `None` for non-finite input.
    pub fn new(a: f64, b: f64) -> Option<Self> {
        if !a.is_finite() || !b.is_finite() {
            return None;
        }
        Some(Self {
            min: a.min(b),
            max: a.max(b),
        })
    }

    /// Inclusive on both ends
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Brush box drawn against two row dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxBounds {
    pub x_dim: Dimension,
    pub y_dim: Dimension,
    pub x: Span,
    pub y: Span,
}

impl BoxBounds {
    /// Corners may be given in any order
    pub fn from_corners(
        x_dim: Dimension,
        y_dim: Dimension,
        (x0, y0): (f64, f64),
        (x1, y1): (f64, f64),
    ) -> Option<Self> {
        Some(Self {
            x_dim,
            y_dim,
            x: Span::new(x0, x1)?,
            y: Span::new(y0, y1)?,
        })
    }

    pub fn x_min(&self) -> f64 {
        self.x.min
    }

    pub fn x_max(&self) -> f64 {
        self.x.max
    }

    pub fn y_min(&self) -> f64 {
        self.y.min
    }

    pub fn y_max(&self) -> f64 {
        self.y.max
    }

    /// Whether the box was drawn against the same pair of dimensions
    pub fn same_axes(&self, other: &BoxBounds) -> bool {
        self.x_dim == other.x_dim && self.y_dim == other.y_dim
    }

    /// Rows missing either dimension are never inside
    pub fn contains(&self, row: &Row) -> bool {
        match (row.value(self.x_dim), row.value(self.y_dim)) {
            (Some(x), Some(y)) => self.x.contains(x) && self.y.contains(y),
            _ => false,
        }
    }
}

/// Keys of every row inside the box
pub fn hit_test<'a, I>(rows: I, bounds: &BoxBounds) -> BTreeSet<RowKey>
where
    I: IntoIterator<Item = &'a Row>,
{
    rows.into_iter()
        .filter(|row| bounds.contains(row))
        .map(Row::key)
        .collect()
}
