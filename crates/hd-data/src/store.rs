//! Immutable in-memory tables loaded once at startup

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use hd_core::{Row, RowKey};
use tracing::{info, warn};

use crate::config::DashboardConfig;
use crate::pipeline::FilterPipeline;
use crate::sources::{
    mean_los_by_week, read_patients_file, read_schedule_file, read_services_file, read_staff_file, StaffMember,
    StaffShift,
};
use crate::DataError;

/// Weekly rows plus the staff tables
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    rows: Arc<[Row]>,
    staff: Vec<StaffMember>,
    schedule: Vec<StaffShift>,
}

/// Set each row's mean LOS from the per-week aggregate
pub fn attach_mean_los(rows: &mut [Row], mean_los: &AHashMap<RowKey, f64>) {
    for row in rows {
        row.mean_los = mean_los.get(&row.key()).copied();
    }
}

fn load_optional<T>(
    path: Option<&PathBuf>,
    read: impl FnOnce(&Path) -> Result<T, DataError>,
) -> Result<Option<T>, DataError> {
    let Some(path) = path else {
        return Ok(None);
    };
    match read(path) {
        Ok(value) => Ok(Some(value)),
        Err(DataError::MissingFile(path)) => {
            warn!(path = %path.display(), "optional table not found, skipping");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

impl Dataset {
    /// Assemble a dataset, rejecting duplicate `(week, service)` rows
    pub fn new(
        name: impl Into<String>,
        mut rows: Vec<Row>,
        staff: Vec<StaffMember>,
        schedule: Vec<StaffShift>,
    ) -> Result<Self, DataError> {
        let mut seen = AHashSet::with_capacity(rows.len());
        if let Some(dup) = rows.iter().find(|row| !seen.insert(row.key())) {
            return Err(DataError::DuplicateKey {
                table: "services_weekly",
                week: dup.week,
                service: dup.service.to_string(),
            });
        }
        rows.sort_by_key(Row::key);
        Ok(Self {
            name: name.into(),
            rows: rows.into(),
            staff,
            schedule,
        })
    }

    /// Read every configured table. Missing optional tables are skipped.
    pub fn load(config: &DashboardConfig) -> Result<Self, DataError> {
        let nulls = &config.null_config;
        let mut rows = read_services_file(&config.services_path, nulls)?;

        let stays = load_optional(config.patients_path.as_ref(), |p| read_patients_file(p, nulls))?;
        if let Some(stays) = &stays {
            attach_mean_los(&mut rows, &mean_los_by_week(stays));
        }
        let staff = load_optional(config.staff_path.as_ref(), |p| read_staff_file(p, nulls))?.unwrap_or_default();
        let schedule =
            load_optional(config.schedule_path.as_ref(), |p| read_schedule_file(p, nulls))?.unwrap_or_default();

        let with_los = rows.iter().filter(|r| r.mean_los.is_some()).count();
        info!(
            rows = rows.len(),
            with_mean_los = with_los,
            patients = stays.as_ref().map_or(0, Vec::len),
            staff = staff.len(),
            shifts = schedule.len(),
            "dataset loaded"
        );

        let name = config
            .services_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("services_weekly")
            .to_string();
        Self::new(name, rows, staff, schedule)
    }

    /// Load on the blocking pool
    pub async fn load_async(config: DashboardConfig) -> Result<Self, DataError> {
        tokio::task::spawn_blocking(move || Self::load(&config)).await?
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &Arc<[Row]> {
        &self.rows
    }

    pub fn staff(&self) -> &[StaffMember] {
        &self.staff
    }

    pub fn schedule(&self) -> &[StaffShift] {
        &self.schedule
    }

    /// Memoized row source over this dataset
    pub fn pipeline(&self, cache_capacity: usize) -> FilterPipeline {
        FilterPipeline::new(self.name.clone(), self.rows.clone(), cache_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hd_core::{FilterSpec, RowSource, Service};

    const SERVICES: &str = "week,month,service,available_beds,patients_request,patients_admitted,patients_refused,patient_satisfaction,staff_morale,event
2,1,ICU,10,12,10,2,80,70,none
1,1,ICU,10,8,8,0,82,71,flu
1,1,surgery,20,25,20,5,75,65,none
";

    const PATIENTS: &str = "patient_id,name,age,arrival_date,departure_date,service,satisfaction
P1,A,40,2025-01-01,2025-01-04,ICU,80
P2,B,41,2025-01-02,2025-01-03,ICU,80
";

    #[test]
    fn test_load_joins_mean_los() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("services_weekly.csv"), SERVICES).unwrap();
        std::fs::write(dir.path().join("patients.csv"), PATIENTS).unwrap();

        let config = DashboardConfig::from_data_dir(dir.path());
        let dataset = Dataset::load(&config).unwrap();
        let rows = dataset.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].key(), RowKey::new(1, Service::Surgery));
        assert_eq!(rows[1].key(), RowKey::new(1, Service::Icu));
        assert_eq!(rows[1].mean_los, Some(2.0));
        assert_eq!(rows[0].mean_los, None);
        assert!(dataset.staff().is_empty());

        let pipeline = dataset.pipeline(4);
        let spec = FilterSpec {
            require_mean_los: true,
            ..FilterSpec::default()
        };
        assert_eq!(pipeline.active_rows(&spec).len(), 1);
    }

    #[test]
    fn test_missing_services_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::from_data_dir(dir.path());
        assert!(matches!(Dataset::load(&config), Err(DataError::MissingFile(_))));
    }

    #[tokio::test]
    async fn test_async_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("services_weekly.csv"), SERVICES).unwrap();
        let dataset = Dataset::load_async(DashboardConfig::from_data_dir(dir.path())).await.unwrap();
        assert_eq!(dataset.name(), "services_weekly");
        assert_eq!(dataset.rows().len(), 3);
    }
}
