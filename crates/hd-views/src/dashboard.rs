//! Dashboard façade: routes events through the sync engine and re-renders
//! only the views a pass affected

use std::collections::BTreeMap;
use std::sync::Arc;

use hd_core::{RowSource, Service, SyncEngine, SyncEvent, SyncOutcome, SyncSnapshot, ViewId, ViewRegistry};
use hd_data::{DashboardConfig, Dataset, StaffId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::adapters::{normalize, Interaction};
use crate::chart::ChartSpec;
use crate::plots::{default_renderers, StaffNetwork};
use crate::predict::{predict_or_fallback, HistoricalPredictor, Prediction, PredictionRequest, Predictor};
use crate::view::{ChartRenderer, RenderInput};

/// Interactions with the staff network; these never touch shared state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum StaffEvent {
    FocusDepartment { service: Service },
    ToggleStaff { staff_id: StaffId },
    ResetTeam,
    /// Host delivers a prediction it was asked for
    PredictionReady {
        request: PredictionRequest,
        prediction: Prediction,
    },
}

/// Anything the host can feed the dashboard
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DashboardEvent {
    Sync(SyncEvent),
    Staff(StaffEvent),
    /// Raw chart payload, normalized before dispatch
    Raw {
        view: ViewId,
        interaction: Interaction,
        payload: Value,
    },
}

/// Result of one handled event
#[derive(Debug, Clone, Serialize)]
pub struct DashboardFrame {
    pub frame: u64,
    /// Engine pass, absent for staff-only events and the initial frame
    pub outcome: Option<SyncOutcome>,
    pub state: SyncSnapshot,
    pub zoom_indicator: String,
    pub brush_summary: String,
    /// Re-rendered charts only; views not listed are unchanged
    pub charts: BTreeMap<ViewId, ChartSpec>,
    /// Predictions the host should run and report back
    pub prediction_requests: Vec<PredictionRequest>,
}

pub struct Dashboard {
    engine: SyncEngine,
    renderers: Vec<Box<dyn ChartRenderer>>,
    network: StaffNetwork,
    frames: u64,
}

impl Dashboard {
    pub fn new(engine: SyncEngine, renderers: Vec<Box<dyn ChartRenderer>>, network: StaffNetwork) -> Self {
        Self {
            engine,
            renderers,
            network,
            frames: 0,
        }
    }

    /// Wire the default views over a loaded dataset
    pub fn from_dataset(dataset: &Dataset, config: &DashboardConfig) -> Self {
        let predictor = Arc::new(HistoricalPredictor::new(
            dataset.rows().clone(),
            dataset.schedule().to_vec(),
        ));
        Self::with_predictor(dataset, config, predictor)
    }

    pub fn with_predictor(dataset: &Dataset, config: &DashboardConfig, predictor: Arc<dyn Predictor>) -> Self {
        let source: Arc<dyn RowSource> = Arc::new(dataset.pipeline(config.filter_cache_capacity));
        let departments = config.default_department_set();
        let focus = departments.iter().next().copied().unwrap_or(Service::Emergency);
        let engine = SyncEngine::new(source, ViewRegistry::dashboard(config.require_mean_los), departments);
        let network = StaffNetwork::new(
            dataset.rows().clone(),
            dataset.staff().to_vec(),
            dataset.schedule(),
            predictor,
            focus,
        );
        info!(
            dataset = dataset.name(),
            rows = dataset.rows().len(),
            staff = dataset.staff().len(),
            "dashboard ready"
        );
        Self::new(engine, default_renderers(), network)
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn network(&self) -> &StaffNetwork {
        &self.network
    }

    pub fn predictor(&self) -> Arc<dyn Predictor> {
        self.network.predictor().clone()
    }

    /// Every view rendered from the current state
    pub fn initial_frame(&mut self) -> DashboardFrame {
        self.network.follow(self.engine.hover(), self.engine.range());
        let views = self.all_views();
        let requests = self.network.pending_request().into_iter().collect();
        self.frame(None, &views, requests)
    }

    pub fn handle(&mut self, event: DashboardEvent) -> DashboardFrame {
        match event {
            DashboardEvent::Sync(event) => self.dispatch(event),
            DashboardEvent::Staff(event) => self.handle_staff(event),
            DashboardEvent::Raw {
                view,
                interaction,
                payload,
            } => match normalize(view, interaction, &payload) {
                Some(event) => self.dispatch(event),
                None => {
                    debug!(view = %view.as_str(), ?interaction, "payload produced no event");
                    self.frame(None, &[], Vec::new())
                }
            },
        }
    }

    /// One engine pass, then the views it touched
    pub fn dispatch(&mut self, event: SyncEvent) -> DashboardFrame {
        let outcome = self.engine.dispatch(event);
        let network_moved = self.network.follow(self.engine.hover(), self.engine.range());

        let mut views = Vec::new();
        if outcome.range_changed || outcome.filter_changed {
            views = self.all_views();
        } else {
            if outcome.selection_changed {
                let registry = self.engine.registry();
                views.extend(ViewId::ALL.into_iter().filter(|v| {
                    *v != ViewId::StaffNetwork && registry.settings(*v).follows_selection
                }));
            }
            if outcome.hover_changed {
                views.push(ViewId::Overview);
            }
            if outcome.overlay_changed {
                views.extend([ViewId::TimeSeries, ViewId::Overview]);
            }
            if network_moved {
                views.push(ViewId::StaffNetwork);
            }
            views.sort();
            views.dedup();
        }

        let requests = self.network.pending_request().into_iter().collect();
        self.frame(Some(outcome), &views, requests)
    }

    fn handle_staff(&mut self, event: StaffEvent) -> DashboardFrame {
        let changed = match event {
            StaffEvent::FocusDepartment { service } => self.network.focus_department(service),
            StaffEvent::ToggleStaff { staff_id } => self.network.toggle_staff(&staff_id),
            StaffEvent::ResetTeam => self.network.reset_team(),
            StaffEvent::PredictionReady { request, prediction } => {
                self.network.prediction_ready(request, prediction)
            }
        };
        let views: &[ViewId] = if changed { &[ViewId::StaffNetwork] } else { &[] };
        let requests = self.network.pending_request().into_iter().collect();
        self.frame(None, views, requests)
    }

    /// Run outstanding predictions inline and fold the results into one frame
    pub fn resolve_pending_blocking(&mut self, frame: DashboardFrame) -> DashboardFrame {
        let predictor = self.predictor();
        let mut last = frame;
        while let Some(request) = last.prediction_requests.pop() {
            let prediction = predict_or_fallback(predictor.as_ref(), &request);
            let mut next = self.handle_staff(StaffEvent::PredictionReady { request, prediction });
            next.prediction_requests.append(&mut last.prediction_requests);
            next.outcome = next.outcome.or(last.outcome);
            for (view, spec) in last.charts {
                next.charts.entry(view).or_insert(spec);
            }
            last = next;
        }
        last
    }

    pub fn brush_summary(&self) -> String {
        if self.engine.rows_for(ViewId::TimeSeries).is_empty() {
            return "Select departments to begin brushing.".to_string();
        }
        match self.engine.selection() {
            Some(selection) if !selection.is_empty() => {
                let from = selection.source.map_or("chart", |v| v.display_name());
                format!(
                    "{} points selected from {}. Click 'Clear Selection' or double-click chart to reset.",
                    selection.keys.len(),
                    from
                )
            }
            _ => "Drag to select points in either chart to brush the other.".to_string(),
        }
    }

    fn all_views(&self) -> Vec<ViewId> {
        ViewId::ALL.to_vec()
    }

    fn render_view(&self, view: ViewId) -> Option<ChartSpec> {
        if view == ViewId::StaffNetwork {
            return Some(self.network.render());
        }
        let renderer = self.renderers.iter().find(|r| r.view() == view)?;
        let rows = self.engine.rows_for(view);
        let range = self.engine.range();
        let input = RenderInput {
            rows: &rows,
            selection: self.engine.selection(),
            role: self.engine.selection_role(view),
            range,
            zoom: range.zoom_level(),
            hover: self.engine.hover(),
            selected_week: self.engine.selected_week(),
            show_events: self.engine.show_events(),
            departments: self.engine.departments(),
        };
        Some(renderer.render(&input))
    }

    fn frame(
        &mut self,
        outcome: Option<SyncOutcome>,
        views: &[ViewId],
        prediction_requests: Vec<PredictionRequest>,
    ) -> DashboardFrame {
        self.frames += 1;
        let charts: BTreeMap<ViewId, ChartSpec> = views
            .iter()
            .filter_map(|v| self.render_view(*v).map(|spec| (*v, spec)))
            .collect();
        let range = self.engine.range();
        debug!(
            frame = self.frames,
            charts = charts.len(),
            requests = prediction_requests.len(),
            "frame built"
        );
        DashboardFrame {
            frame: self.frames,
            outcome,
            state: self.engine.snapshot(),
            zoom_indicator: range.zoom_level().indicator(range),
            brush_summary: self.brush_summary(),
            charts,
            prediction_requests,
        }
    }
}
