//! `relayoutData`: zoom, pan, double-click and dragged brush boxes

use hd_core::{BoxBounds, SyncEvent, ViewId};
use serde_json::{Map, Value};

use super::selected_data::TIME_SERIES_AXES;
use super::{number, pair};

/// Key a drawing surface may add to echo the selection epoch it drew
pub const EPOCH_KEY: &str = "selection_epoch";

const X_AXES: [&str; 2] = ["xaxis", "xaxis2"];

fn is_autorange(fields: &Map<String, Value>) -> bool {
    fields
        .iter()
        .any(|(key, value)| key.contains("autorange") && value.as_bool() == Some(true))
}

/// `shapes[0].x0` .. `shapes[0].y1`, all four required
fn moved_box(view: ViewId, fields: &Map<String, Value>) -> Option<SyncEvent> {
    let corner = |name: &str| fields.get(&format!("shapes[0].{name}")).and_then(number);
    let (x0, x1, y0, y1) = (corner("x0")?, corner("x1")?, corner("y0")?, corner("y1")?);
    if view != ViewId::TimeSeries {
        return None;
    }
    let (x_dim, y_dim) = TIME_SERIES_AXES;
    let bounds = BoxBounds::from_corners(x_dim, y_dim, (x0, y0), (x1, y1))?;
    let epoch = fields.get(EPOCH_KEY).and_then(Value::as_u64);
    Some(SyncEvent::BoxMoved { view, bounds, epoch })
}

/// `xaxis.range` as an array, or `xaxis.range[0]` / `xaxis.range[1]`
fn x_range(fields: &Map<String, Value>) -> Option<(f64, f64)> {
    let whole = X_AXES
        .iter()
        .find_map(|axis| fields.get(&format!("{axis}.range")).and_then(pair));
    whole.or_else(|| {
        X_AXES.iter().find_map(|axis| {
            let lo = fields.get(&format!("{axis}.range[0]")).and_then(number)?;
            let hi = fields.get(&format!("{axis}.range[1]")).and_then(number)?;
            Some((lo, hi))
        })
    })
}

pub fn to_event(view: ViewId, payload: &Value) -> Option<SyncEvent> {
    let fields = payload.as_object()?;
    if is_autorange(fields) {
        return Some(SyncEvent::Autorange { view });
    }
    if let Some(event) = moved_box(view, fields) {
        return Some(event);
    }
    x_range(fields).map(|(x0, x1)| SyncEvent::ChartZoomed { view, x0, x1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_autorange_wins() {
        let payload = json!({ "xaxis.autorange": true, "xaxis.range[0]": 3, "xaxis.range[1]": 9 });
        assert_eq!(
            to_event(ViewId::Overview, &payload),
            Some(SyncEvent::Autorange { view: ViewId::Overview })
        );
        let payload = json!({ "yaxis.autorange": true });
        assert!(matches!(to_event(ViewId::TimeSeries, &payload), Some(SyncEvent::Autorange { .. })));
    }

    #[test]
    fn test_zoom_shapes() {
        let split = json!({ "xaxis2.range[0]": 4.6, "xaxis2.range[1]": 12.2 });
        assert_eq!(
            to_event(ViewId::Overview, &split),
            Some(SyncEvent::ChartZoomed { view: ViewId::Overview, x0: 4.6, x1: 12.2 })
        );
        let whole = json!({ "xaxis.range": [20, 8] });
        assert_eq!(
            to_event(ViewId::Overview, &whole),
            Some(SyncEvent::ChartZoomed { view: ViewId::Overview, x0: 20.0, x1: 8.0 })
        );
    }

    #[test]
    fn test_dragged_box() {
        let payload = json!({
            "shapes[0].x0": 12, "shapes[0].x1": 8,
            "shapes[0].y0": 0.7, "shapes[0].y1": 1.3,
            "selection_epoch": 4
        });
        let Some(SyncEvent::BoxMoved { bounds, epoch, .. }) = to_event(ViewId::TimeSeries, &payload) else {
            panic!("expected a box move");
        };
        assert_eq!(epoch, Some(4));
        assert_eq!((bounds.x_min(), bounds.x_max()), (8.0, 12.0));

        let partial = json!({ "shapes[0].x0": 12, "shapes[0].x1": 8 });
        assert_eq!(to_event(ViewId::TimeSeries, &partial), None);
    }

    #[test]
    fn test_unusable_payloads() {
        assert_eq!(to_event(ViewId::Overview, &json!(null)), None);
        assert_eq!(to_event(ViewId::Overview, &json!({ "dragmode": "pan" })), None);
        assert_eq!(to_event(ViewId::Overview, &json!({ "xaxis.range": [1] })), None);
    }
}
