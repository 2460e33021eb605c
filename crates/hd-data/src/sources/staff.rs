//! Staff roster and weekly presence

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::StringRecord;
use hd_core::{Service, UnknownName, FIRST_WEEK, LAST_WEEK};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{csv_reader, open, Columns};
use crate::config::NullConfig;
use crate::DataError;

/// Staff identifier as written in the source tables
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(pub String);

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StaffId {
    fn from(id: &str) -> Self {
        StaffId(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Doctor,
    Nurse,
    NursingAssistant,
}

impl StaffRole {
    pub fn label(&self) -> &'static str {
        match self {
            StaffRole::Doctor => "Doctor",
            StaffRole::Nurse => "Nurse",
            StaffRole::NursingAssistant => "Nursing Assistant",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            StaffRole::Doctor => "#56C1C1",
            StaffRole::Nurse => "#B57EDC",
            StaffRole::NursingAssistant => "#FFD166",
        }
    }
}

impl FromStr for StaffRole {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(' ', "_").as_str() {
            "doctor" => Ok(StaffRole::Doctor),
            "nurse" => Ok(StaffRole::Nurse),
            "nursing_assistant" => Ok(StaffRole::NursingAssistant),
            other => Err(UnknownName {
                kind: "staff role",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub name: String,
    pub role: StaffRole,
    pub service: Service,
}

/// Presence of one staff member in one week
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffShift {
    pub week: u32,
    pub staff_id: StaffId,
    pub service: Service,
    pub present: bool,
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Some(true),
        "0" | "0.0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_member(columns: &Columns<'_>, record: &StringRecord) -> Result<StaffMember, DataError> {
    let id: String = columns.required(record, "staff_id")?;
    Ok(StaffMember {
        id: StaffId(id),
        name: columns.cell(record, "staff_name").unwrap_or_default().to_string(),
        role: columns.required(record, "role")?,
        service: columns.required(record, "service")?,
    })
}

fn parse_shift(columns: &Columns<'_>, record: &StringRecord) -> Result<StaffShift, DataError> {
    let week = columns.count(record, "week")?;
    if !(FIRST_WEEK..=LAST_WEEK).contains(&week) {
        return Err(columns.invalid(record, "week", &week.to_string()));
    }
    let raw = columns.cell(record, "present").unwrap_or_default();
    let present = parse_flag(raw).ok_or_else(|| columns.invalid(record, "present", raw))?;
    let id: String = columns.required(record, "staff_id")?;
    Ok(StaffShift {
        week,
        staff_id: StaffId(id),
        service: columns.required(record, "service")?,
        present,
    })
}

pub fn read_staff<R: Read>(reader: R, nulls: &NullConfig) -> Result<Vec<StaffMember>, DataError> {
    let mut csv = csv_reader(reader);
    let headers = csv.headers()?.clone();
    let columns = Columns::new("staff", &headers, &["staff_id", "role", "service"], nulls)?;
    let staff = csv
        .records()
        .map(|result| parse_member(&columns, &result?))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(staff = staff.len(), "read staff roster");
    Ok(staff)
}

pub fn read_schedule<R: Read>(reader: R, nulls: &NullConfig) -> Result<Vec<StaffShift>, DataError> {
    let mut csv = csv_reader(reader);
    let headers = csv.headers()?.clone();
    let columns = Columns::new(
        "staff_schedule",
        &headers,
        &["week", "staff_id", "service", "present"],
        nulls,
    )?;
    let shifts = csv
        .records()
        .map(|result| parse_shift(&columns, &result?))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(shifts = shifts.len(), "read staff schedule");
    Ok(shifts)
}

pub fn read_staff_file(path: &Path, nulls: &NullConfig) -> Result<Vec<StaffMember>, DataError> {
    read_staff(open(path)?, nulls)
}

pub fn read_schedule_file(path: &Path, nulls: &NullConfig) -> Result<Vec<StaffShift>, DataError> {
    read_schedule(open(path)?, nulls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_roles() {
        let staff = read_staff(
            "staff_id,staff_name,role,service\nSTF-1,Dr. Lee,doctor,ICU\nSTF-2,Kim,nursing_assistant,surgery\n".as_bytes(),
            &NullConfig::default(),
        )
        .unwrap();
        assert_eq!(staff[0].role, StaffRole::Doctor);
        assert_eq!(staff[1].id, StaffId::from("STF-2"));
        assert_eq!(staff[1].service, Service::Surgery);
    }

    #[test]
    fn test_schedule_presence_flags() {
        let shifts = read_schedule(
            "week,staff_id,staff_name,role,service,present\n1,STF-1,Dr. Lee,doctor,ICU,1\n2,STF-1,Dr. Lee,doctor,ICU,0\n".as_bytes(),
            &NullConfig::default(),
        )
        .unwrap();
        assert!(shifts[0].present);
        assert!(!shifts[1].present);

        let err = read_schedule(
            "week,staff_id,service,present\n1,STF-1,ICU,maybe\n".as_bytes(),
            &NullConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DataError::Parse { column: "present", .. }));
    }
}
