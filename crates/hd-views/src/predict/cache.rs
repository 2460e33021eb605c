//! Finished predictions keyed by department and team

use ahash::{AHashMap, AHashSet};

use super::{Prediction, PredictionRequest};

/// Predictions delivered so far plus the requests still out
#[derive(Debug, Clone, Default)]
pub struct PredictionCache {
    ready: AHashMap<PredictionRequest, Prediction>,
    in_flight: AHashSet<PredictionRequest>,
}

impl PredictionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, request: &PredictionRequest) -> Option<&Prediction> {
        self.ready.get(request)
    }

    /// Record a request as sent. Returns false when it is already answered or out.
    pub fn mark_requested(&mut self, request: &PredictionRequest) -> bool {
        if self.ready.contains_key(request) {
            return false;
        }
        self.in_flight.insert(request.clone())
    }

    pub fn insert(&mut self, request: PredictionRequest, prediction: Prediction) {
        self.in_flight.remove(&request);
        self.ready.insert(request, prediction);
    }
}
