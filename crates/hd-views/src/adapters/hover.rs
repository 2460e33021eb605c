//! `hoverData` from the overview

use hd_core::{Service, SyncEvent, ViewId};
use serde_json::Value;

use super::number;

/// First point's `x` is the week; `customdata[0]`, when present, the department.
/// No points means the pointer left the chart.
pub fn to_event(view: ViewId, payload: &Value) -> Option<SyncEvent> {
    if payload.is_null() {
        return Some(SyncEvent::HoverCleared);
    }
    let points = payload.get("points")?.as_array()?;
    let Some(point) = points.first() else {
        return Some(SyncEvent::HoverCleared);
    };
    let week = number(point.get("x")?)?.round() as i64;
    let service = point
        .get("customdata")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Service>().ok());
    Some(SyncEvent::Hovered { view, week, service })
}
