//! `clickData` from charts with a week axis

use hd_core::{SyncEvent, ViewId};
use serde_json::Value;

use super::number;

/// First clicked point's `x`, rounded to a week. A click that carries no
/// points or no `x` leaves the current week alone.
pub fn to_event(view: ViewId, payload: &Value) -> Option<SyncEvent> {
    let point = payload.get("points")?.as_array()?.first()?;
    let week = number(point.get("x")?)?.round() as i64;
    Some(SyncEvent::WeekClicked { view, week })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clicked_week_is_rounded() {
        let payload = json!({ "points": [{ "x": 13.6, "y": 0.9, "curveNumber": 1 }] });
        assert_eq!(
            to_event(ViewId::TimeSeries, &payload),
            Some(SyncEvent::WeekClicked {
                view: ViewId::TimeSeries,
                week: 14
            })
        );
        let payload = json!({ "points": [{ "x": "7" }] });
        assert!(matches!(
            to_event(ViewId::Overview, &payload),
            Some(SyncEvent::WeekClicked { week: 7, .. })
        ));
    }

    #[test]
    fn test_click_without_a_week_is_ignored() {
        assert_eq!(to_event(ViewId::TimeSeries, &json!(null)), None);
        assert_eq!(to_event(ViewId::TimeSeries, &json!({ "points": [] })), None);
        assert_eq!(to_event(ViewId::TimeSeries, &json!({ "points": [{ "y": 2 }] })), None);
        assert_eq!(to_event(ViewId::TimeSeries, &json!({ "points": [{ "x": "week" }] })), None);
    }
}
