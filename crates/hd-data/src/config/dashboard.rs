//! File locations and dashboard defaults

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use hd_core::Service;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::null_handling::NullConfig;
use crate::DataError;

pub const SERVICES_FILE: &str = "services_weekly.csv";
pub const PATIENTS_FILE: &str = "patients.csv";
pub const STAFF_FILE: &str = "staff.csv";
pub const SCHEDULE_FILE: &str = "staff_schedule.csv";

/// Dashboard configuration, read from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Weekly services table (required)
    pub services_path: PathBuf,

    /// Patient stays, joined as mean length of stay
    pub patients_path: Option<PathBuf>,

    /// Staff roster
    pub staff_path: Option<PathBuf>,

    /// Weekly staff presence
    pub schedule_path: Option<PathBuf>,

    /// Departments shown at startup and after a global reset
    pub default_departments: Vec<Service>,

    /// Drop rows without a mean length of stay from the brushing views
    pub require_mean_los: bool,

    /// Number of filtered row sets kept in memory
    pub filter_cache_capacity: usize,

    /// Null handling for optional cells
    pub null_config: NullConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::from_data_dir("data")
    }
}

impl DashboardConfig {
    /// Conventional file names inside one directory
    pub fn from_data_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            services_path: dir.join(SERVICES_FILE),
            patients_path: Some(dir.join(PATIENTS_FILE)),
            staff_path: Some(dir.join(STAFF_FILE)),
            schedule_path: Some(dir.join(SCHEDULE_FILE)),
            default_departments: Service::ALL.to_vec(),
            require_mean_los: true,
            filter_cache_capacity: 32,
            null_config: NullConfig::default(),
        }
    }

    /// Read a JSON config file. Relative paths inside it are resolved
    /// against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DataError::MissingFile(path.to_path_buf()),
            _ => DataError::Io(e),
        })?;
        let mut config: DashboardConfig = serde_json::from_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        config.validate()?;
        debug!(config = %path.display(), services = %config.services_path.display(), "loaded dashboard config");
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.services_path);
        for optional in [&mut self.patients_path, &mut self.staff_path, &mut self.schedule_path] {
            if let Some(p) = optional.as_mut() {
                resolve(p);
            }
        }
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.services_path.as_os_str().is_empty() {
            return Err(DataError::Config("services_path must be set".into()));
        }
        if self.filter_cache_capacity == 0 {
            return Err(DataError::Config("filter_cache_capacity must be at least 1".into()));
        }
        Ok(())
    }

    pub fn default_department_set(&self) -> BTreeSet<Service> {
        self.default_departments.iter().copied().collect()
    }
}
