//! `restyleData` from the parallel coordinates week axis

use hd_core::{Span, SyncEvent};
use serde_json::Value;

use super::pair;

/// `[a, b]` or `[[a, b], ...]`; the first interval wins
fn constraint_span(value: &Value) -> Option<Span> {
    let first = value.as_array()?.first()?;
    let (a, b) = if first.is_array() {
        pair(first)?
    } else {
        pair(value)?
    };
    Span::new(a, b)
}

/// Payload is `[{ "dimensions[0].constraintrange": ... }, ...]`. A null or
/// empty constraint clears the range.
pub fn to_event(payload: &Value) -> Option<SyncEvent> {
    let changes = payload.as_array()?.first()?.as_object()?;
    let (_, value) = changes
        .iter()
        .find(|(key, _)| key.contains("dimensions[0]") && key.contains("constraintrange"))?;
    match value {
        Value::Null => Some(SyncEvent::PcpConstraint { span: None }),
        Value::Array(items) if items.is_empty() => Some(SyncEvent::PcpConstraint { span: None }),
        other => constraint_span(other).map(|span| SyncEvent::PcpConstraint { span: Some(span) }),
    }
}
