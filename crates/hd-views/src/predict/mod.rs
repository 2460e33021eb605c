//! Team outcome prediction for the staff network
//!
//! A [`Predictor`] answers "what morale and satisfaction would this team
//! produce" for one department. Predictions can be slow, so the dashboard
//! never calls a predictor inline: it records a [`PredictionRequest`], the
//! host runs it off-thread and feeds the result back as a new event.

use std::collections::BTreeSet;

use hd_core::Service;
use hd_data::StaffId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

mod cache;
mod historical;

pub use cache::PredictionCache;
pub use historical::{HistoricalPredictor, ModelCache, PresenceModel};

/// Errors that can occur while predicting
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictError {
    #[error("no usable history for {0}")]
    NoHistory(Service),

    #[error("team is empty")]
    EmptyTeam,

    #[error("staff member {0} is not on the {1} roster")]
    UnknownStaff(StaffId, Service),
}

/// Where a prediction's numbers came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionSource {
    /// The team worked together in this week; values are that week's actuals
    Historical { week: u32 },
    /// Estimated by the model
    Model,
    /// Department average used because prediction failed
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub morale: f64,
    pub satisfaction: f64,
    pub source: PredictionSource,
}

impl Prediction {
    /// Placeholder when no department average is known
    pub const UNKNOWN: Prediction = Prediction {
        morale: 0.0,
        satisfaction: 0.0,
        source: PredictionSource::Fallback,
    };

    pub fn is_historical_match(&self) -> bool {
        matches!(self.source, PredictionSource::Historical { .. })
    }

    pub fn matched_week(&self) -> Option<u32> {
        match self.source {
            PredictionSource::Historical { week } => Some(week),
            _ => None,
        }
    }
}

/// Estimated effect of one staff member's presence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffImpact {
    pub staff_id: StaffId,
    pub morale: f64,
    pub satisfaction: f64,
}

/// Prediction work the host should run and report back
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub department: Service,
    pub team: BTreeSet<StaffId>,
}

/// Predictor collaborator
pub trait Predictor: Send + Sync {
    /// Outcome for a team working in the department
    fn predict(&self, department: Service, team: &BTreeSet<StaffId>) -> Result<Prediction, PredictError>;

    /// Historical department average, used when prediction fails
    fn baseline(&self, department: Service) -> Prediction;

    /// Per-staff effects, used to size network nodes
    fn staff_impacts(&self, _department: Service) -> Vec<StaffImpact> {
        Vec::new()
    }
}

/// Predict, degrading to the department baseline on failure
pub fn predict_or_fallback(predictor: &dyn Predictor, request: &PredictionRequest) -> Prediction {
    match predictor.predict(request.department, &request.team) {
        Ok(prediction) => prediction,
        Err(e) => {
            warn!(department = %request.department, error = %e, "prediction failed, using department average");
            predictor.baseline(request.department)
        }
    }
}
