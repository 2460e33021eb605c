//! `selectedData` from the brushable charts

use hd_core::{BoxBounds, Dimension, RowKey, Service, SyncEvent, ViewId, FIRST_WEEK, LAST_WEEK};
use serde_json::Value;
use tracing::debug;

use super::{number, pair};

/// Axes a time series brush box is drawn against
pub const TIME_SERIES_AXES: (Dimension, Dimension) = (Dimension::Week, Dimension::PressureIndex);

/// Row identity from a point's `customdata = [week, service, ...]`
fn point_key(point: &Value) -> Option<RowKey> {
    let custom = point.get("customdata")?.as_array()?;
    let week = number(custom.first()?)?.round();
    if week < FIRST_WEEK as f64 || week > LAST_WEEK as f64 {
        return None;
    }
    let service: Service = custom.get(1)?.as_str()?.parse().ok()?;
    Some(RowKey::new(week as u32, service))
}

/// Box from `range: {x: [..], y: [..]}`; only the time series has one axis pair
fn box_bounds(view: ViewId, payload: &Value) -> Option<BoxBounds> {
    if view != ViewId::TimeSeries {
        return None;
    }
    let range = payload.get("range")?;
    let (x0, x1) = pair(range.get("x")?)?;
    let (y0, y1) = pair(range.get("y")?)?;
    let (x_dim, y_dim) = TIME_SERIES_AXES;
    BoxBounds::from_corners(x_dim, y_dim, (x0, y0), (x1, y1))
}

pub fn to_event(view: ViewId, payload: &Value) -> Option<SyncEvent> {
    let points = payload.get("points")?.as_array()?;
    let mut keys: Vec<RowKey> = points.iter().filter_map(point_key).collect();
    if keys.len() < points.len() {
        debug!(view = %view, dropped = points.len() - keys.len(), "points without usable customdata");
    }
    keys.sort();
    keys.dedup();
    Some(SyncEvent::Brushed {
        view,
        keys,
        box_bounds: box_bounds(view, payload),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_points_and_box() {
        let payload = json!({
            "points": [
                { "x": 10, "y": 0.9, "customdata": [10, "ICU", 40, "none"] },
                { "x": 11, "y": 1.1, "customdata": [11.0, "surgery", 20, "flu"] },
                { "x": 11, "y": 1.1, "customdata": [11, "surgery"] },
                { "x": 12, "y": 1.0, "customdata": [60, "surgery"] },
                { "x": 12, "y": 1.0 }
            ],
            "range": { "x": [15, 10], "y": [1.2, 0.8] }
        });
        let event = to_event(ViewId::TimeSeries, &payload).unwrap();
        let SyncEvent::Brushed { keys, box_bounds, .. } = event else {
            panic!("expected a brush event");
        };
        assert_eq!(
            keys,
            vec![RowKey::new(10, Service::Icu), RowKey::new(11, Service::Surgery)]
        );
        let bounds = box_bounds.unwrap();
        assert_eq!((bounds.x_min(), bounds.x_max()), (10.0, 15.0));
        assert_eq!((bounds.y_min(), bounds.y_max()), (0.8, 1.2));
    }

    #[test]
    fn test_matrix_brush_has_no_box() {
        let payload = json!({
            "points": [{ "customdata": [4, "emergency", 30] }],
            "range": { "x": [0, 1], "y": [0, 1] }
        });
        let event = to_event(ViewId::Splom, &payload).unwrap();
        assert!(matches!(event, SyncEvent::Brushed { box_bounds: None, .. }));
    }

    #[test]
    fn test_empty_and_missing_payloads() {
        let event = to_event(ViewId::Splom, &json!({ "points": [] })).unwrap();
        assert!(matches!(event, SyncEvent::Brushed { ref keys, .. } if keys.is_empty()));
        assert!(to_event(ViewId::Splom, &json!(null)).is_none());
    }
}
