//! Predictor fitted on past weeks of the schedule

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ahash::AHashMap;
use hd_core::{is_anomaly_week, Row, Service};
use hd_data::{StaffId, StaffShift};
use parking_lot::Mutex;
use tracing::debug;

use super::{PredictError, Prediction, PredictionSource, Predictor, StaffImpact};
use crate::plots::utils::mean;

/// One usable week of history
#[derive(Debug, Clone, PartialEq)]
struct TrainingWeek {
    week: u32,
    team: BTreeSet<StaffId>,
    morale: f64,
    satisfaction: f64,
}

/// Per-staff deviation from the department mean when present
#[derive(Debug, Clone, Copy, PartialEq)]
struct PresenceEffect {
    presence_rate: f64,
    morale: f64,
    satisfaction: f64,
}

/// Presence-effect model for one department
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceModel {
    department: Service,
    weeks: Vec<TrainingWeek>,
    mean_morale: f64,
    mean_satisfaction: f64,
    effects: BTreeMap<StaffId, PresenceEffect>,
}

/// Mean of `metric` over weeks the staff member worked, minus its mean elsewhere
fn presence_delta(weeks: &[TrainingWeek], id: &StaffId, metric: fn(&TrainingWeek) -> f64) -> f64 {
    let with = mean(weeks.iter().filter(|w| w.team.contains(id)).map(metric));
    let without = mean(weeks.iter().filter(|w| !w.team.contains(id)).map(metric));
    match (with, without) {
        (Some(a), Some(b)) => a - b,
        _ => 0.0,
    }
}

impl PresenceModel {
    /// Fit on the department's non-anomaly weeks that have both a row and a schedule
    pub fn fit(department: Service, rows: &[Row], schedule: &[StaffShift]) -> Result<Self, PredictError> {
        let mut teams: BTreeMap<u32, BTreeSet<StaffId>> = BTreeMap::new();
        let mut roster = BTreeSet::new();
        for shift in schedule.iter().filter(|s| s.service == department) {
            roster.insert(shift.staff_id.clone());
            let team = teams.entry(shift.week).or_default();
            if shift.present {
                team.insert(shift.staff_id.clone());
            }
        }

        let weeks: Vec<TrainingWeek> = rows
            .iter()
            .filter(|r| r.service == department && !is_anomaly_week(r.week))
            .filter_map(|r| {
                teams.get(&r.week).map(|team| TrainingWeek {
                    week: r.week,
                    team: team.clone(),
                    morale: r.morale,
                    satisfaction: r.satisfaction,
                })
            })
            .collect();
        if weeks.is_empty() {
            return Err(PredictError::NoHistory(department));
        }

        let n = weeks.len() as f64;
        let effects = roster
            .into_iter()
            .map(|id| {
                let present = weeks.iter().filter(|w| w.team.contains(&id)).count() as f64;
                let effect = PresenceEffect {
                    presence_rate: present / n,
                    morale: presence_delta(&weeks, &id, |w| w.morale),
                    satisfaction: presence_delta(&weeks, &id, |w| w.satisfaction),
                };
                (id, effect)
            })
            .collect();

        let model = Self {
            department,
            mean_morale: mean(weeks.iter().map(|w| w.morale)).unwrap_or_default(),
            mean_satisfaction: mean(weeks.iter().map(|w| w.satisfaction)).unwrap_or_default(),
            weeks,
            effects,
        };
        debug!(
            department = %department,
            weeks = model.weeks.len(),
            staff = model.effects.len(),
            "presence model fitted"
        );
        Ok(model)
    }

    pub fn department(&self) -> Service {
        self.department
    }

    pub fn predict(&self, team: &BTreeSet<StaffId>) -> Result<Prediction, PredictError> {
        if team.is_empty() {
            return Err(PredictError::EmptyTeam);
        }
        if let Some(unknown) = team.iter().find(|id| !self.effects.contains_key(*id)) {
            return Err(PredictError::UnknownStaff(unknown.clone(), self.department));
        }
        if let Some(matched) = self.weeks.iter().find(|w| &w.team == team) {
            return Ok(Prediction {
                morale: matched.morale,
                satisfaction: matched.satisfaction,
                source: PredictionSource::Historical { week: matched.week },
            });
        }

        let (mut morale, mut satisfaction) = (self.mean_morale, self.mean_satisfaction);
        for (id, effect) in &self.effects {
            let present = if team.contains(id) { 1.0 } else { 0.0 };
            let deviation = present - effect.presence_rate;
            morale += effect.morale * deviation;
            satisfaction += effect.satisfaction * deviation;
        }
        Ok(Prediction {
            morale: morale.clamp(0.0, 100.0),
            satisfaction: satisfaction.clamp(0.0, 100.0),
            source: PredictionSource::Model,
        })
    }

    pub fn impacts(&self) -> Vec<StaffImpact> {
        self.effects
            .iter()
            .map(|(id, effect)| StaffImpact {
                staff_id: id.clone(),
                morale: effect.morale,
                satisfaction: effect.satisfaction,
            })
            .collect()
    }
}

/// Fit results keyed by department. Failures are kept too, so a department
/// without history is not refitted on every request.
#[derive(Debug, Default)]
pub struct ModelCache {
    models: Mutex<AHashMap<Service, Result<Arc<PresenceModel>, PredictError>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_fit(
        &self,
        department: Service,
        fit: impl FnOnce() -> Result<PresenceModel, PredictError>,
    ) -> Result<Arc<PresenceModel>, PredictError> {
        if let Some(result) = self.models.lock().get(&department) {
            return result.clone();
        }
        // Fit outside the lock
        let result = fit().map(Arc::new);
        if let Err(e) = &result {
            debug!(department = %department, error = %e, "fit failed, caching the failure");
        }
        self.models.lock().insert(department, result.clone());
        result
    }

    /// Departments with a cached fit result, successful or not
    pub fn len(&self) -> usize {
        self.models.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Default predictor over the loaded rows and schedule
#[derive(Debug)]
pub struct HistoricalPredictor {
    rows: Arc<[Row]>,
    schedule: Arc<[StaffShift]>,
    models: ModelCache,
}

impl HistoricalPredictor {
    pub fn new(rows: Arc<[Row]>, schedule: impl Into<Arc<[StaffShift]>>) -> Self {
        Self {
            rows,
            schedule: schedule.into(),
            models: ModelCache::new(),
        }
    }

    pub fn models(&self) -> &ModelCache {
        &self.models
    }

    fn model(&self, department: Service) -> Result<Arc<PresenceModel>, PredictError> {
        self.models
            .get_or_fit(department, || PresenceModel::fit(department, &self.rows, &self.schedule))
    }
}

impl Predictor for HistoricalPredictor {
    fn predict(&self, department: Service, team: &BTreeSet<StaffId>) -> Result<Prediction, PredictError> {
        self.model(department)?.predict(team)
    }

    fn baseline(&self, department: Service) -> Prediction {
        let rows = || self.rows.iter().filter(|r| r.service == department);
        Prediction {
            morale: mean(rows().map(|r| r.morale)).unwrap_or_default(),
            satisfaction: mean(rows().map(|r| r.satisfaction)).unwrap_or_default(),
            source: PredictionSource::Fallback,
        }
    }

    fn staff_impacts(&self, department: Service) -> Vec<StaffImpact> {
        self.model(department).map(|m| m.impacts()).unwrap_or_default()
    }
}
