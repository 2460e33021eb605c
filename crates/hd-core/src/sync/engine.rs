//! Synchronization graph: one triggering event per pass, one hop to the displays

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::{SelectionRole, ViewRegistry};
use crate::events::{SyncEvent, ViewId};
use crate::filter::{FilterSpec, RowSource};
use crate::range::{ControlDisplays, RangeState, WeekRange, ZoomLevel};
use crate::row::{Row, Service, FIRST_WEEK, LAST_WEEK};
use crate::selection::{Selection, SelectionState, StaleBoxMove};

/// Week (and optionally department) under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hover {
    pub view: ViewId,
    pub week: u32,
    pub service: Option<Service>,
}

/// Why an event was dropped without effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Discard {
    NotBrushable(ViewId),
    DoesNotDriveRange(ViewId),
    NotInteractive(ViewId),
    StaleBoxMove(StaleBoxMove),
}

/// What a single pass changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub pass: u64,
    pub trigger: &'static str,
    pub source: Option<ViewId>,
    pub range_changed: bool,
    pub selection_changed: bool,
    pub filter_changed: bool,
    pub hover_changed: bool,
    /// Clicked week or event-marker setting moved
    pub overlay_changed: bool,
    pub discarded: Option<Discard>,
}

impl SyncOutcome {
    fn new(pass: u64, event: &SyncEvent) -> Self {
        Self {
            pass,
            trigger: event.kind(),
            source: event.source(),
            range_changed: false,
            selection_changed: false,
            filter_changed: false,
            hover_changed: false,
            overlay_changed: false,
            discarded: None,
        }
    }

    /// Whether dependent views must be re-derived
    pub fn changed(&self) -> bool {
        self.range_changed
            || self.selection_changed
            || self.filter_changed
            || self.hover_changed
            || self.overlay_changed
    }
}

/// Settled state after a pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncSnapshot {
    pub range: WeekRange,
    pub zoom_level: ZoomLevel,
    pub displays: ControlDisplays,
    pub selection: Option<Selection>,
    pub departments: BTreeSet<Service>,
    pub hide_anomalies: bool,
    pub hover: Option<Hover>,
    pub selected_week: Option<u32>,
    pub show_events: bool,
}

/// Sole owner of selection, range, filter settings, hover and the clicked week.
///
/// `dispatch` takes `&mut self` and never calls back into itself, so a pass
/// is one triggering event followed by a read-only re-derivation of every
/// dependent display. Control displays are pure functions of the range.
pub struct SyncEngine {
    rows: Arc<dyn RowSource>,
    registry: ViewRegistry,
    range: RangeState,
    selection: SelectionState,
    departments: BTreeSet<Service>,
    default_departments: BTreeSet<Service>,
    hide_anomalies: bool,
    hover: Option<Hover>,
    selected_week: Option<u32>,
    show_events: bool,
    passes: u64,
}

impl SyncEngine {
    pub fn new(
        rows: Arc<dyn RowSource>,
        registry: ViewRegistry,
        default_departments: BTreeSet<Service>,
    ) -> Self {
        Self {
            rows,
            registry,
            range: RangeState::new(),
            selection: SelectionState::new(),
            departments: default_departments.clone(),
            default_departments,
            hide_anomalies: false,
            hover: None,
            selected_week: None,
            show_events: true,
            passes: 0,
        }
    }

    /// Apply one event and report what changed
    pub fn dispatch(&mut self, event: SyncEvent) -> SyncOutcome {
        self.passes += 1;
        let mut outcome = SyncOutcome::new(self.passes, &event);

        match event {
            SyncEvent::SliderChanged { min, max } => {
                outcome.range_changed = self.range.apply_slider(min, max);
            }
            SyncEvent::WeekInputsChanged { start, end } => {
                outcome.range_changed = self.range.apply_inputs(start, end);
            }
            SyncEvent::QuickSelect { preset } => {
                outcome.range_changed = self.range.apply_preset(preset);
            }
            SyncEvent::ChartZoomed { view, x0, x1 } => {
                if self.registry.drives_range(view) {
                    outcome.range_changed = self.range.apply_zoom(x0, x1);
                } else {
                    outcome.discarded = Some(Discard::DoesNotDriveRange(view));
                }
            }
            SyncEvent::Autorange { view } => {
                let settings = self.registry.settings(view);
                if settings.can_brush || settings.drives_range {
                    if settings.can_brush || settings.zoomable {
                        outcome.selection_changed = self.selection.clear().changed();
                    }
                    outcome.range_changed = self.range.apply_autorange();
                    if self.hover.is_some_and(|hover| hover.view == view) {
                        self.hover = None;
                        outcome.hover_changed = true;
                    }
                } else {
                    outcome.discarded = Some(Discard::NotInteractive(view));
                }
            }
            SyncEvent::PcpConstraint { span } => {
                if self.registry.drives_range(ViewId::ParallelCoordinates) {
                    outcome.range_changed = self.range.apply_constraint(span.map(|s| (s.min, s.max)));
                } else {
                    outcome.discarded = Some(Discard::DoesNotDriveRange(ViewId::ParallelCoordinates));
                }
            }
            SyncEvent::Brushed {
                view,
                keys,
                box_bounds,
            } => {
                if self.registry.can_brush(view) {
                    if keys.is_empty() {
                        debug!(view = %view, "empty brush payload, keeping selection");
                    }
                    let keys = keys.into_iter().collect();
                    outcome.selection_changed =
                        self.selection.set_from_brush(Some(view), keys, box_bounds).changed();
                } else {
                    outcome.discarded = Some(Discard::NotBrushable(view));
                }
            }
            SyncEvent::BoxMoved {
                view,
                bounds,
                epoch,
            } => {
                let rows = self.rows_for(view);
                match self
                    .selection
                    .recompute_from_box_move(view, bounds, epoch, rows.iter())
                {
                    Ok(change) => outcome.selection_changed = change.changed(),
                    Err(stale) => outcome.discarded = Some(Discard::StaleBoxMove(stale)),
                }
            }
            SyncEvent::ClearSelection => {
                outcome.selection_changed = self.selection.clear().changed();
            }
            SyncEvent::Reset => {
                outcome.selection_changed = self.selection.clear().changed();
                outcome.range_changed = self.range.reset();
                outcome.filter_changed = self.set_departments(self.default_departments.clone());
                outcome.hover_changed = self.hover.take().is_some();
                outcome.overlay_changed = self.selected_week.take().is_some();
            }
            SyncEvent::DepartmentsChanged { services } => {
                outcome.filter_changed = self.set_departments(services.into_iter().collect());
            }
            SyncEvent::SelectAllDepartments => {
                outcome.filter_changed = self.set_departments(Service::ALL.into_iter().collect());
            }
            SyncEvent::HideAnomaliesChanged { hide } => {
                outcome.filter_changed = self.hide_anomalies != hide;
                self.hide_anomalies = hide;
            }
            SyncEvent::Hovered {
                view,
                week,
                service,
            } => {
                let next = (FIRST_WEEK as i64..=LAST_WEEK as i64)
                    .contains(&week)
                    .then(|| Hover {
                        view,
                        week: week as u32,
                        service,
                    });
                outcome.hover_changed = self.hover != next;
                self.hover = next;
            }
            SyncEvent::HoverCleared => {
                outcome.hover_changed = self.hover.take().is_some();
            }
            SyncEvent::WeekClicked { view, week } => {
                let settings = self.registry.settings(view);
                if settings.can_brush || settings.zoomable {
                    let week = week.clamp(FIRST_WEEK as i64, LAST_WEEK as i64) as u32;
                    outcome.overlay_changed = self.selected_week.replace(week) != Some(week);
                } else {
                    outcome.discarded = Some(Discard::NotInteractive(view));
                }
            }
            SyncEvent::ClearWeekSelection => {
                outcome.overlay_changed = self.selected_week.take().is_some();
            }
            SyncEvent::ShowEventsChanged { show } => {
                outcome.overlay_changed = self.show_events != show;
                self.show_events = show;
            }
        }

        match outcome.discarded {
            Some(Discard::NotBrushable(view)) => {
                warn!(pass = outcome.pass, view = %view, "brush from a view that cannot brush ignored");
            }
            Some(reason) => {
                debug!(pass = outcome.pass, trigger = outcome.trigger, ?reason, "event discarded");
            }
            None => {
                debug!(
                    pass = outcome.pass,
                    trigger = outcome.trigger,
                    range = ?self.range.current(),
                    range_changed = outcome.range_changed,
                    selection_changed = outcome.selection_changed,
                    filter_changed = outcome.filter_changed,
                    hover_changed = outcome.hover_changed,
                    overlay_changed = outcome.overlay_changed,
                    "sync pass settled"
                );
            }
        }

        outcome
    }

    fn set_departments(&mut self, departments: BTreeSet<Service>) -> bool {
        if self.departments == departments {
            return false;
        }
        self.departments = departments;
        true
    }

    pub fn range(&self) -> WeekRange {
        self.range.current()
    }

    pub fn displays(&self) -> ControlDisplays {
        ControlDisplays::from(self.range.current())
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.current()
    }

    pub fn hover(&self) -> Option<Hover> {
        self.hover
    }

    /// Week picked by the last click, kept until cleared or reset
    pub fn selected_week(&self) -> Option<u32> {
        self.selected_week
    }

    pub fn show_events(&self) -> bool {
        self.show_events
    }

    pub fn departments(&self) -> &BTreeSet<Service> {
        &self.departments
    }

    pub fn hide_anomalies(&self) -> bool {
        self.hide_anomalies
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    /// Filter the given view reads its rows through
    pub fn filter_spec_for(&self, view: ViewId) -> FilterSpec {
        let settings = self.registry.settings(view);
        FilterSpec {
            range: if settings.follows_range {
                self.range.current()
            } else {
                WeekRange::FULL
            },
            departments: self.departments.clone(),
            hide_anomalies: self.hide_anomalies,
            require_mean_los: settings.requires_mean_los,
        }
    }

    /// Filtered rows for a view, before any selection narrowing
    pub fn rows_for(&self, view: ViewId) -> Arc<[Row]> {
        self.rows.active_rows(&self.filter_spec_for(view))
    }

    pub fn selection_role(&self, view: ViewId) -> SelectionRole {
        self.registry.selection_role(view, self.selection.current())
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        let range = self.range.current();
        SyncSnapshot {
            range,
            zoom_level: range.zoom_level(),
            displays: ControlDisplays::from(range),
            selection: self.selection.current().cloned(),
            departments: self.departments.clone(),
            hide_anomalies: self.hide_anomalies,
            hover: self.hover,
            selected_week: self.selected_week,
            show_events: self.show_events,
        }
    }
}
