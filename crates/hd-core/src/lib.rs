//! Core of the hospital dashboard
//!
//! Holds the weekly row model and the synchronization engine that keeps the
//! shared selection, week range, department filter and hover state consistent
//! across every view. No I/O happens here; rows arrive through [`RowSource`].

pub mod events;
pub mod filter;
pub mod range;
pub mod row;
pub mod selection;
pub mod sync;

// Re-export commonly used types
pub use events::{SyncEvent, ViewId};
pub use filter::{is_anomaly_week, FilterSpec, RowSource, StaticRows};
pub use range::{ControlDisplays, QuickSelect, RangeState, WeekRange, ZoomLevel};
pub use row::{Dimension, Row, RowKey, Service, UnknownName, WeekEvent, FIRST_WEEK, LAST_WEEK};
pub use selection::{hit_test, BoxBounds, Selection, SelectionChange, SelectionState, Span, StaleBoxMove};
pub use sync::{
    Discard, Hover, SelectionRole, SyncEngine, SyncOutcome, SyncSnapshot, ViewRegistry, ViewSyncSettings,
};
