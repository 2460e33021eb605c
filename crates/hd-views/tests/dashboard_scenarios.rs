use std::collections::BTreeSet;

use hd_core::{Row, RowKey, Service, SyncEvent, ViewId, WeekEvent, WeekRange, FIRST_WEEK, LAST_WEEK};
use hd_data::{DashboardConfig, Dataset, StaffId, StaffMember, StaffRole};
use hd_views::{ChartBody, Dashboard, DashboardEvent, Interaction, StaffEvent};
use serde_json::{json, Value};

fn make_row(week: u32, service: Service) -> Row {
    let wave = ((week as f64 + service as u32 as f64 * 3.0) / 6.0).sin() * 0.35;
    let pressure_index = ((0.95 + wave) * 100.0).round() / 100.0;
    let beds = 40;
    let demand = (pressure_index * beds as f64).round() as u32;
    let admitted = demand.min(beds);
    Row {
        week,
        service,
        event: WeekEvent::None,
        beds,
        demand,
        admitted,
        refused: demand - admitted,
        satisfaction: 70.0 + (week % 9) as f64,
        morale: 60.0 + (week % 5) as f64,
        pressure_index,
        acceptance_rate: 95.0,
        refusal_rate: 5.0,
        utilization_rate: 88.0,
        mean_los: Some(4.0),
    }
}

fn dashboard() -> Dashboard {
    let rows = Service::ALL
        .into_iter()
        .flat_map(|service| (FIRST_WEEK..=LAST_WEEK).map(move |week| make_row(week, service)))
        .collect();
    let staff = vec![StaffMember {
        id: StaffId::from("ICU-1"),
        name: "Ines".to_string(),
        role: StaffRole::Nurse,
        service: Service::Icu,
    }];
    let dataset = Dataset::new("scenario", rows, staff, Vec::new()).unwrap();
    let config = DashboardConfig::from_data_dir("unused");
    let mut dashboard = Dashboard::from_dataset(&dataset, &config);
    dashboard.initial_frame();
    dashboard
}

fn raw(view: ViewId, interaction: Interaction, payload: Value) -> DashboardEvent {
    DashboardEvent::Raw {
        view,
        interaction,
        payload,
    }
}

fn in_box(row: &Row) -> bool {
    (10..=15).contains(&row.week) && (0.8..=1.2).contains(&row.pressure_index)
}

/// selectedData the time series reports for the box x in [10, 15], y in [0.8, 1.2]
fn time_series_brush(dashboard: &Dashboard) -> Value {
    let rows = dashboard.engine().rows_for(ViewId::TimeSeries);
    let points: Vec<Value> = rows
        .iter()
        .filter(|r| in_box(r))
        .map(|r| json!({"x": r.week, "y": r.pressure_index, "customdata": [r.week, r.service.as_str()]}))
        .collect();
    json!({"points": points, "range": {"x": [15.0, 10.0], "y": [1.2, 0.8]}})
}

fn expected_box_keys(dashboard: &Dashboard) -> BTreeSet<RowKey> {
    let rows = dashboard.engine().rows_for(ViewId::TimeSeries);
    rows.iter().filter(|r| in_box(r)).map(Row::key).collect()
}

#[test]
fn brush_box_selects_rows_inside_it() {
    let mut dashboard = dashboard();
    let payload = time_series_brush(&dashboard);
    let frame = dashboard.handle(raw(ViewId::TimeSeries, Interaction::SelectedData, payload));

    let selection = frame.state.selection.expect("selection set");
    let expected = expected_box_keys(&dashboard);
    assert!(!expected.is_empty());
    assert_eq!(selection.keys, expected);
    assert_eq!(selection.source, Some(ViewId::TimeSeries));
    assert!(frame.charts.contains_key(&ViewId::Splom));

    // Moving the box back onto itself recomputes the same keys
    let epoch = selection.epoch;
    let frame = dashboard.handle(raw(
        ViewId::TimeSeries,
        Interaction::RelayoutData,
        json!({
            "shapes[0].x0": 10, "shapes[0].x1": 15,
            "shapes[0].y0": 0.8, "shapes[0].y1": 1.2,
            "selection_epoch": epoch
        }),
    ));
    assert_eq!(frame.state.selection.map(|s| s.keys), Some(expected));
}

#[test]
fn brush_respects_department_filter() {
    let mut dashboard = dashboard();
    dashboard.dispatch(SyncEvent::DepartmentsChanged {
        services: vec![Service::Surgery],
    });
    let payload = time_series_brush(&dashboard);
    let frame = dashboard.handle(raw(ViewId::TimeSeries, Interaction::SelectedData, payload));
    let selection = frame.state.selection.expect("selection set");
    assert!(selection.keys.iter().all(|k| k.service == Service::Surgery));
}

#[test]
fn pcp_constraint_narrows_range() {
    let mut dashboard = dashboard();
    let frame = dashboard.handle(raw(
        ViewId::ParallelCoordinates,
        Interaction::RestyleData,
        json!([{"dimensions[0].constraintrange": [5, 50]}]),
    ));
    assert_eq!(frame.state.range, WeekRange::new(5, 50).unwrap());
    assert_eq!(frame.charts.len(), ViewId::ALL.len());

    let frame = dashboard.handle(raw(
        ViewId::ParallelCoordinates,
        Interaction::RestyleData,
        json!([{"dimensions[0].constraintrange": null}]),
    ));
    assert!(frame.state.range.is_full());
    assert_eq!(frame.zoom_indicator, "Overview (W1-52)");
}

#[test]
fn autorange_clears_selection_and_range() {
    let mut dashboard = dashboard();
    dashboard.dispatch(SyncEvent::SliderChanged { min: 8, max: 20 });
    let payload = time_series_brush(&dashboard);
    dashboard.handle(raw(ViewId::TimeSeries, Interaction::SelectedData, payload));
    assert!(dashboard.engine().selection().is_some());

    let frame = dashboard.handle(raw(
        ViewId::TimeSeries,
        Interaction::RelayoutData,
        json!({"xaxis.autorange": true}),
    ));
    assert!(frame.state.selection.is_none());
    assert!(frame.state.range.is_full());
    assert_eq!(
        frame.brush_summary,
        "Drag to select points in either chart to brush the other."
    );
}

#[test]
fn empty_brush_from_same_source_keeps_selection() {
    let mut dashboard = dashboard();
    let payload = time_series_brush(&dashboard);
    let before = dashboard
        .handle(raw(ViewId::TimeSeries, Interaction::SelectedData, payload))
        .state
        .selection;

    let frame = dashboard.handle(raw(
        ViewId::TimeSeries,
        Interaction::SelectedData,
        json!({"points": []}),
    ));
    assert_eq!(frame.state.selection, before);
    assert!(frame.outcome.is_some_and(|o| !o.selection_changed));

    let frame = dashboard.dispatch(SyncEvent::ClearSelection);
    assert!(frame.state.selection.is_none());
}

#[test]
fn department_without_history_falls_back_to_average() {
    let mut dashboard = dashboard();
    dashboard.handle(DashboardEvent::Staff(StaffEvent::FocusDepartment { service: Service::Icu }));
    let frame = dashboard.handle(DashboardEvent::Staff(StaffEvent::ToggleStaff {
        staff_id: StaffId::from("ICU-1"),
    }));
    assert_eq!(frame.prediction_requests.len(), 1);

    let frame = dashboard.resolve_pending_blocking(frame);
    match &frame.charts[&ViewId::StaffNetwork].body {
        ChartBody::Network { status, metrics, .. } => {
            assert_eq!(status, "Fallback");
            assert!(metrics.iter().all(|m| m.value == Some(m.average)));
        }
        other => panic!("expected network body, got {other:?}"),
    }
}

#[test]
fn frames_serialize_to_json() {
    let mut dashboard = dashboard();
    let frame = dashboard.dispatch(SyncEvent::QuickSelect {
        preset: hd_core::QuickSelect::Q1,
    });
    let value = serde_json::to_value(&frame).unwrap();
    assert!(value["charts"]["efficiency-timeseries"].is_object());
    assert_eq!(value["outcome"]["trigger"], "quick_select");
}
