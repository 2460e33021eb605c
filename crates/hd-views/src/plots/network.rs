//! Staff network for one department and one focused week
//!
//! Department, role and staff nodes; staff in the shown team are marked as
//! working. The team is the focused week's actual roster until the user
//! toggles a member, after which it is a custom team whose outcome comes
//! from the predictor through the prediction cache.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use hd_core::{is_anomaly_week, Hover, Row, Service, ViewId, WeekRange, FIRST_WEEK, LAST_WEEK};
use hd_data::{StaffId, StaffMember, StaffRole, StaffShift};
use serde::Serialize;
use tracing::{debug, warn};

use crate::chart::{ChartBody, ChartSpec, MetricComparison, NetworkEdge, NetworkNode, NodeKind};
use crate::predict::{Prediction, PredictionCache, PredictionRequest, PredictionSource, Predictor};

const DEPARTMENT_NODE_SIZE: f64 = 60.0;
const ROLE_NODE_SIZE: f64 = 30.0;
const STAFF_NODE_MIN: f64 = 40.0;
const STAFF_NODE_SPAN: f64 = 40.0;

/// Nearest week outside the anomaly calendar; ties go to the earlier week
pub fn snap_week(week: u32) -> u32 {
    let week = week.clamp(FIRST_WEEK, LAST_WEEK);
    if !is_anomaly_week(week) {
        return week;
    }
    (1..=LAST_WEEK)
        .flat_map(|d| [week.checked_sub(d), Some(week + d)])
        .flatten()
        .find(|w| (FIRST_WEEK..=LAST_WEEK).contains(w) && !is_anomaly_week(*w))
        .unwrap_or(week)
}

/// Where the shown metrics come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TeamStatus {
    /// The week's real team and outcome
    Actual { week: u32 },
    /// Custom team that worked together in an earlier week
    Matched { week: u32 },
    Predicted,
    /// Prediction requested, not yet delivered
    Pending,
    /// Prediction failed; department averages shown
    Fallback,
}

impl TeamStatus {
    pub fn label(&self) -> String {
        match self {
            TeamStatus::Actual { week } => format!("W{week} actual"),
            TeamStatus::Matched { week } => format!("Week {week} config"),
            TeamStatus::Predicted => "Predicted".to_string(),
            TeamStatus::Pending => "Pending".to_string(),
            TeamStatus::Fallback => "Fallback".to_string(),
        }
    }
}

/// Node sizes and department averages, read from the predictor once
#[derive(Debug, Clone, PartialEq)]
struct DepartmentProfile {
    sizes: BTreeMap<StaffId, f64>,
    baseline: Prediction,
}

impl DepartmentProfile {
    fn snapshot(predictor: &dyn Predictor, department: Service) -> Self {
        let impacts = predictor.staff_impacts(department);
        let max = impacts.iter().map(|i| i.morale.abs()).fold(0.0, f64::max);
        let sizes = impacts
            .into_iter()
            .map(|i| {
                let scaled = if max > 0.0 { i.morale.abs() / max } else { 0.0 };
                (i.staff_id, STAFF_NODE_MIN + scaled * STAFF_NODE_SPAN)
            })
            .collect();
        Self {
            sizes,
            baseline: predictor.baseline(department),
        }
    }
}

/// Staff network state and renderer. Rendering never calls the predictor;
/// team outcomes arrive through [`StaffNetwork::prediction_ready`].
pub struct StaffNetwork {
    rows: Arc<[Row]>,
    staff: Vec<StaffMember>,
    teams: BTreeMap<(Service, u32), BTreeSet<StaffId>>,
    predictor: Arc<dyn Predictor>,
    predictions: PredictionCache,
    profiles: BTreeMap<Service, DepartmentProfile>,
    department: Service,
    week: u32,
    custom_team: Option<BTreeSet<StaffId>>,
}

impl StaffNetwork {
    pub fn new(
        rows: Arc<[Row]>,
        staff: Vec<StaffMember>,
        schedule: &[StaffShift],
        predictor: Arc<dyn Predictor>,
        department: Service,
    ) -> Self {
        let mut teams: BTreeMap<(Service, u32), BTreeSet<StaffId>> = BTreeMap::new();
        for shift in schedule.iter().filter(|s| s.present) {
            teams
                .entry((shift.service, shift.week))
                .or_default()
                .insert(shift.staff_id.clone());
        }
        let profiles = Service::ALL
            .into_iter()
            .map(|service| (service, DepartmentProfile::snapshot(predictor.as_ref(), service)))
            .collect();
        debug!(staff = staff.len(), "staff network profiles taken");
        Self {
            rows,
            staff,
            teams,
            predictor,
            predictions: PredictionCache::new(),
            profiles,
            department,
            week: snap_week(LAST_WEEK),
            custom_team: None,
        }
    }

    pub fn department(&self) -> Service {
        self.department
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn custom_team(&self) -> Option<&BTreeSet<StaffId>> {
        self.custom_team.as_ref()
    }

    pub fn predictor(&self) -> &Arc<dyn Predictor> {
        &self.predictor
    }

    fn roster(&self) -> impl Iterator<Item = &StaffMember> {
        let department = self.department;
        self.staff.iter().filter(move |m| m.service == department)
    }

    /// Staff who worked the focused week
    pub fn actual_team(&self) -> BTreeSet<StaffId> {
        self.teams
            .get(&(self.department, self.week))
            .cloned()
            .unwrap_or_default()
    }

    /// Team currently shown
    pub fn team(&self) -> BTreeSet<StaffId> {
        self.custom_team.clone().unwrap_or_else(|| self.actual_team())
    }

    /// Follow the hovered week (else the range end) and the hovered department.
    /// Returns true when the shown week or department moved.
    pub fn follow(&mut self, hover: Option<Hover>, range: WeekRange) -> bool {
        let mut changed = false;
        if let Some(service) = hover.and_then(|h| h.service) {
            changed |= self.focus_department(service);
        }
        let week = snap_week(hover.map_or(range.max(), |h| h.week));
        if week != self.week {
            debug!(from = self.week, to = week, "staff network week moved");
            self.week = week;
            self.custom_team = None;
            changed = true;
        }
        changed
    }

    pub fn focus_department(&mut self, department: Service) -> bool {
        if department == self.department {
            return false;
        }
        self.department = department;
        self.custom_team = None;
        true
    }

    /// Add or remove one roster member from the shown team
    pub fn toggle_staff(&mut self, id: &StaffId) -> bool {
        if !self.roster().any(|m| &m.id == id) {
            warn!(staff = %id, department = %self.department, "toggle ignored, not on roster");
            return false;
        }
        let mut team = self.team();
        if !team.remove(id) {
            team.insert(id.clone());
        }
        self.custom_team = Some(team);
        true
    }

    pub fn reset_team(&mut self) -> bool {
        self.custom_team.take().is_some()
    }

    fn current_request(&self) -> Option<PredictionRequest> {
        self.custom_team.as_ref().map(|team| PredictionRequest {
            department: self.department,
            team: team.clone(),
        })
    }

    /// Request the host should fulfil, issued once per custom team
    pub fn pending_request(&mut self) -> Option<PredictionRequest> {
        let request = self.current_request()?;
        self.predictions.mark_requested(&request).then_some(request)
    }

    pub fn prediction_ready(&mut self, request: PredictionRequest, prediction: Prediction) -> bool {
        let shown = self.current_request().as_ref() == Some(&request);
        self.predictions.insert(request, prediction);
        shown
    }

    /// Values shown for the current team, `None` while pending
    pub fn outcome(&self) -> (TeamStatus, Option<(f64, f64)>) {
        let Some(request) = self.current_request() else {
            let actual = self
                .rows
                .iter()
                .find(|r| r.service == self.department && r.week == self.week)
                .map(|r| (r.morale, r.satisfaction))
                .unwrap_or_else(|| {
                    let baseline = self.baseline();
                    (baseline.morale, baseline.satisfaction)
                });
            return (TeamStatus::Actual { week: self.week }, Some(actual));
        };
        match self.predictions.get(&request) {
            None => (TeamStatus::Pending, None),
            Some(p) => {
                let status = match p.source {
                    PredictionSource::Historical { week } => TeamStatus::Matched { week },
                    PredictionSource::Model => TeamStatus::Predicted,
                    PredictionSource::Fallback => TeamStatus::Fallback,
                };
                (status, Some((p.morale, p.satisfaction)))
            }
        }
    }

    /// Department average for the focused department
    fn baseline(&self) -> Prediction {
        self.profiles
            .get(&self.department)
            .map_or(Prediction::UNKNOWN, |p| p.baseline)
    }

    fn staff_size(&self, id: &StaffId) -> f64 {
        self.profiles
            .get(&self.department)
            .and_then(|p| p.sizes.get(id))
            .copied()
            .unwrap_or(STAFF_NODE_MIN)
    }

    pub fn render(&self) -> ChartSpec {
        let title = format!("Staff Network - {}", self.department.label());
        let roster: Vec<&StaffMember> = self.roster().collect();
        if roster.is_empty() {
            return ChartSpec::empty(
                ViewId::StaffNetwork,
                title,
                format!("No staff roster for {}", self.department.label()),
            );
        }

        let team = self.team();
        let department_id = format!("dept:{}", self.department.as_str());
        let mut nodes = vec![NetworkNode {
            id: department_id.clone(),
            label: self.department.label().to_string(),
            kind: NodeKind::Department,
            color: self.department.color().to_string(),
            size: DEPARTMENT_NODE_SIZE,
            working: false,
        }];
        let mut edges = Vec::new();

        let roles: BTreeSet<StaffRole> = roster.iter().map(|m| m.role).collect();
        for role in roles {
            let role_id = format!("role:{}:{:?}", self.department.as_str(), role);
            nodes.push(NetworkNode {
                id: role_id.clone(),
                label: role.label().to_string(),
                kind: NodeKind::Role,
                color: role.color().to_string(),
                size: ROLE_NODE_SIZE,
                working: false,
            });
            edges.push(NetworkEdge {
                source: department_id.clone(),
                target: role_id.clone(),
            });
            for member in roster.iter().filter(|m| m.role == role) {
                let staff_id = format!("staff:{}", member.id);
                nodes.push(NetworkNode {
                    id: staff_id.clone(),
                    label: if member.name.is_empty() {
                        member.id.to_string()
                    } else {
                        member.name.clone()
                    },
                    kind: NodeKind::Staff,
                    color: role.color().to_string(),
                    size: self.staff_size(&member.id),
                    working: team.contains(&member.id),
                });
                edges.push(NetworkEdge {
                    source: role_id.clone(),
                    target: staff_id,
                });
            }
        }

        let (status, values) = self.outcome();
        let average = self.baseline();
        let metrics = vec![
            MetricComparison {
                metric: "Morale".to_string(),
                value: values.map(|(morale, _)| morale),
                average: average.morale,
            },
            MetricComparison {
                metric: "Satisfaction".to_string(),
                value: values.map(|(_, satisfaction)| satisfaction),
                average: average.satisfaction,
            },
        ];

        ChartSpec::new(
            ViewId::StaffNetwork,
            title,
            ChartBody::Network {
                department: self.department,
                week: self.week,
                nodes,
                edges,
                metrics,
                status: status.label(),
                team_size: team.len(),
                custom_team: self.custom_team.is_some(),
            },
        )
        .with_subtitle(format!("Week {}", self.week))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::plots::test_support::row;
    use crate::predict::{HistoricalPredictor, PredictError, StaffImpact};

    fn member(id: &str, role: StaffRole) -> StaffMember {
        StaffMember {
            id: StaffId::from(id),
            name: format!("Staff {id}"),
            role,
            service: Service::Surgery,
        }
    }

    fn network() -> StaffNetwork {
        let mut rows = Vec::new();
        let mut schedule = Vec::new();
        for week in 1..=52 {
            let b_present = week % 2 == 0;
            let mut r = row(week, Service::Surgery);
            r.morale = if b_present { 70.0 } else { 60.0 };
            rows.push(r);
            for (id, present) in [("A", true), ("B", b_present), ("C", false)] {
                schedule.push(StaffShift {
                    week,
                    staff_id: StaffId::from(id),
                    service: Service::Surgery,
                    present,
                });
            }
        }
        let rows: Arc<[Row]> = rows.into();
        let staff = vec![
            member("A", StaffRole::Doctor),
            member("B", StaffRole::Nurse),
            member("C", StaffRole::NursingAssistant),
        ];
        let predictor = Arc::new(HistoricalPredictor::new(rows.clone(), schedule.clone()));
        StaffNetwork::new(rows, staff, &schedule, predictor, Service::Surgery)
    }

    fn body(spec: &ChartSpec) -> (&[NetworkNode], &str, bool) {
        match &spec.body {
            ChartBody::Network {
                nodes,
                status,
                custom_team,
                ..
            } => (nodes.as_slice(), status.as_str(), *custom_team),
            other => panic!("expected network body, got {other:?}"),
        }
    }

    #[test]
    fn test_snap_week_skips_anomalies() {
        assert_eq!(snap_week(3), 2);
        assert_eq!(snap_week(51), 50);
        assert_eq!(snap_week(52), 52);
        assert_eq!(snap_week(0), 1);
    }

    #[test]
    fn test_actual_week_view() {
        let mut network = network();
        assert!(network.follow(None, WeekRange::new(1, 10).unwrap()));
        assert_eq!(network.week(), 10);
        let spec = network.render();
        let (nodes, status, custom) = body(&spec);
        assert_eq!(status, "W10 actual");
        assert!(!custom);
        // department, three roles, three staff
        assert_eq!(nodes.len(), 7);
        let working: Vec<&str> = nodes.iter().filter(|n| n.working).map(|n| n.id.as_str()).collect();
        assert_eq!(working, vec!["staff:A", "staff:B"]);
        let b = nodes.iter().find(|n| n.id == "staff:B").unwrap();
        assert_eq!(b.size, 80.0);
    }

    #[test]
    fn test_custom_team_waits_for_prediction() {
        let mut network = network();
        network.follow(None, WeekRange::new(1, 10).unwrap());
        assert!(network.toggle_staff(&StaffId::from("B")));
        assert_eq!(network.team(), [StaffId::from("A")].into_iter().collect());

        let request = network.pending_request().unwrap();
        assert!(network.pending_request().is_none());
        assert_eq!(body(&network.render()).1, "Pending");

        let prediction = crate::predict::predict_or_fallback(network.predictor.as_ref(), &request);
        assert!(network.prediction_ready(request, prediction));
        let spec = network.render();
        assert_eq!(body(&spec).1, "Week 1 config");
    }

    #[test]
    fn test_week_change_resets_custom_team() {
        let mut network = network();
        network.follow(None, WeekRange::new(1, 10).unwrap());
        network.toggle_staff(&StaffId::from("C"));
        assert!(network.custom_team().is_some());
        let hover = Hover {
            view: ViewId::Overview,
            week: 6,
            service: None,
        };
        assert!(network.follow(Some(hover), WeekRange::FULL));
        assert_eq!(network.week(), 5);
        assert!(network.custom_team().is_none());
    }

    #[test]
    fn test_unknown_staff_is_ignored() {
        let mut network = network();
        assert!(!network.toggle_staff(&StaffId::from("Z")));
        assert!(network.custom_team().is_none());
    }

    /// Counts every predictor call
    struct Counting {
        inner: HistoricalPredictor,
        calls: AtomicUsize,
    }

    impl Predictor for Counting {
        fn predict(&self, department: Service, team: &BTreeSet<StaffId>) -> Result<Prediction, PredictError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.predict(department, team)
        }

        fn baseline(&self, department: Service) -> Prediction {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.baseline(department)
        }

        fn staff_impacts(&self, department: Service) -> Vec<StaffImpact> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.staff_impacts(department)
        }
    }

    #[test]
    fn test_render_never_calls_predictor() {
        let base = network();
        let predictor = Arc::new(Counting {
            inner: HistoricalPredictor::new(base.rows.clone(), Vec::<StaffShift>::new()),
            calls: AtomicUsize::new(0),
        });
        let historical = Arc::new(HistoricalPredictor::new(base.rows.clone(), Vec::<StaffShift>::new()));
        let mut network = StaffNetwork::new(
            base.rows.clone(),
            base.staff.clone(),
            &[],
            predictor.clone(),
            Service::Surgery,
        );
        let after_new = predictor.calls.load(Ordering::SeqCst);
        network.render();
        network.focus_department(Service::Icu);
        network.render();
        network.render();
        assert_eq!(predictor.calls.load(Ordering::SeqCst), after_new);

        // Fits happen at construction, none during render
        let mut network = StaffNetwork::new(
            base.rows.clone(),
            base.staff.clone(),
            &[],
            historical.clone(),
            Service::Surgery,
        );
        let fitted = historical.models().len();
        // Failed fits are cached too
        assert_eq!(fitted, Service::ALL.len());
        network.render();
        network.focus_department(Service::Icu);
        network.render();
        assert_eq!(historical.models().len(), fitted);
    }

    #[test]
    fn test_department_without_roster() {
        let mut network = network();
        network.focus_department(Service::Icu);
        assert!(network.render().is_empty());
    }
}
