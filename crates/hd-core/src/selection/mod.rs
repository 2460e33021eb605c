//! Canonical selection shared by every view

use std::collections::BTreeSet;

use serde::Serialize;

use crate::events::ViewId;
use crate::row::{Row, RowKey};

pub mod geometry;

pub use geometry::{hit_test, BoxBounds, Span};

/// Rows chosen by a brush, plus where they came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    /// Producing view; `None` for programmatic selections
    pub source: Option<ViewId>,
    pub keys: BTreeSet<RowKey>,
    /// Present only for rectangular brushes
    pub box_bounds: Option<BoxBounds>,
    /// Bumped whenever a new selection is established or cleared
    pub epoch: u64,
}

impl Selection {
    pub fn contains(&self, key: &RowKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn same_content(&self, source: Option<ViewId>, keys: &BTreeSet<RowKey>, bounds: Option<&BoxBounds>) -> bool {
        self.source == source && &self.keys == keys && self.box_bounds.as_ref() == bounds
    }
}

/// Outcome of a selection operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Unchanged,
    Changed,
}

impl SelectionChange {
    pub fn changed(self) -> bool {
        matches!(self, SelectionChange::Changed)
    }
}

/// Why a box-move recomputation was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleBoxMove {
    NoSelection,
    NoBox,
    ForeignSource,
    EpochMismatch,
    AxesMismatch,
}

/// Single owner of the current selection
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    current: Option<Selection>,
    epoch: u64,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Overwrite from a brush. An empty payload never clears an existing
    /// selection: plot libraries emit one after finishing a drag.
    pub fn set_from_brush(
        &mut self,
        source: Option<ViewId>,
        keys: BTreeSet<RowKey>,
        box_bounds: Option<BoxBounds>,
    ) -> SelectionChange {
        if keys.is_empty() {
            return SelectionChange::Unchanged;
        }
        if let Some(current) = &self.current {
            if current.same_content(source, &keys, box_bounds.as_ref()) {
                return SelectionChange::Unchanged;
            }
        }
        self.epoch += 1;
        self.current = Some(Selection {
            source,
            keys,
            box_bounds,
            epoch: self.epoch,
        });
        SelectionChange::Changed
    }

    pub fn clear(&mut self) -> SelectionChange {
        if self.current.take().is_none() {
            return SelectionChange::Unchanged;
        }
        self.epoch += 1;
        SelectionChange::Changed
    }

    /// Re-select every row inside a dragged box. The selection keeps its
    /// source and epoch; zero matches is a valid empty-box state.
    pub fn recompute_from_box_move<'a, I>(
        &mut self,
        view: ViewId,
        bounds: BoxBounds,
        expected_epoch: Option<u64>,
        rows: I,
    ) -> Result<SelectionChange, StaleBoxMove>
    where
        I: IntoIterator<Item = &'a Row>,
    {
        let current = self.current.as_mut().ok_or(StaleBoxMove::NoSelection)?;
        let previous = current.box_bounds.ok_or(StaleBoxMove::NoBox)?;
        if current.source != Some(view) {
            return Err(StaleBoxMove::ForeignSource);
        }
        if expected_epoch.is_some_and(|epoch| epoch != current.epoch) {
            return Err(StaleBoxMove::EpochMismatch);
        }
        if !previous.same_axes(&bounds) {
            return Err(StaleBoxMove::AxesMismatch);
        }

        let keys = hit_test(rows, &bounds);
        if previous == bounds && keys == current.keys {
            return Ok(SelectionChange::Unchanged);
        }
        current.keys = keys;
        current.box_bounds = Some(bounds);
        Ok(SelectionChange::Changed)
    }
}
