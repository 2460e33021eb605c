//! Raw chart payloads to canonical events
//!
//! Charts report interactions as loosely shaped JSON (Plotly's
//! `selectedData`, `relayoutData`, `restyleData`, `hoverData` and
//! `clickData`). Each adapter accepts every shape the charts are known to
//! send and produces at most one [`SyncEvent`]; a payload with nothing
//! usable yields `None`.

use hd_core::{SyncEvent, ViewId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod click;
pub mod hover;
pub mod relayout;
pub mod restyle;
pub mod selected_data;

/// Kind of raw payload a chart emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interaction {
    SelectedData,
    RelayoutData,
    RestyleData,
    HoverData,
    ClickData,
}

/// Translate one raw payload
pub fn normalize(view: ViewId, interaction: Interaction, payload: &Value) -> Option<SyncEvent> {
    match interaction {
        Interaction::SelectedData => selected_data::to_event(view, payload),
        Interaction::RelayoutData => relayout::to_event(view, payload),
        Interaction::RestyleData if view == ViewId::ParallelCoordinates => restyle::to_event(payload),
        Interaction::RestyleData => None,
        Interaction::HoverData => hover::to_event(view, payload),
        Interaction::ClickData => click::to_event(view, payload),
    }
}

/// Number from a JSON number or numeric string
pub(crate) fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// `[a, b]` as a pair of numbers
pub(crate) fn pair(value: &Value) -> Option<(f64, f64)> {
    match value.as_array()?.as_slice() {
        [a, b] => Some((number(a)?, number(b)?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_and_pairs() {
        assert_eq!(number(&json!(3)), Some(3.0));
        assert_eq!(number(&json!("4.5")), Some(4.5));
        assert_eq!(number(&json!(null)), None);
        assert_eq!(pair(&json!([1, "2"])), Some((1.0, 2.0)));
        assert_eq!(pair(&json!([1])), None);
    }

    #[test]
    fn test_restyle_only_from_pcp() {
        let payload = json!([{ "dimensions[0].constraintrange": null }]);
        assert!(normalize(ViewId::ParallelCoordinates, Interaction::RestyleData, &payload).is_some());
        assert!(normalize(ViewId::Overview, Interaction::RestyleData, &payload).is_none());
    }
}
