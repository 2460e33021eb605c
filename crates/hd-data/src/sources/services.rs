//! Weekly services table and its derived columns

use std::io::Read;
use std::path::Path;

use ahash::AHashSet;
use csv::StringRecord;
use hd_core::{Row, Service, WeekEvent, FIRST_WEEK, LAST_WEEK};
use tracing::debug;

use super::{csv_reader, open, Columns};
use crate::config::NullConfig;
use crate::DataError;

const TABLE: &str = "services_weekly";

const REQUIRED: [&str; 8] = [
    "week",
    "service",
    "available_beds",
    "patients_request",
    "patients_admitted",
    "patients_refused",
    "patient_satisfaction",
    "staff_morale",
];

/// One parsed line of the services table, before derivation
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRecord {
    pub week: u32,
    pub service: Service,
    pub event: WeekEvent,
    pub beds: u32,
    pub demand: u32,
    pub admitted: u32,
    pub refused: u32,
    pub satisfaction: f64,
    pub morale: f64,
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    numerator as f64 / denominator.max(1) as f64
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Compute the derived columns. A zero divisor counts as one.
pub fn derive_row(record: &ServiceRecord, mean_los: Option<f64>) -> Row {
    Row {
        week: record.week,
        service: record.service,
        event: record.event,
        beds: record.beds,
        demand: record.demand,
        admitted: record.admitted,
        refused: record.refused,
        satisfaction: record.satisfaction,
        morale: record.morale,
        pressure_index: round_to(ratio(record.demand, record.beds), 2),
        acceptance_rate: round_to(ratio(record.admitted, record.demand) * 100.0, 1),
        refusal_rate: round_to(ratio(record.refused, record.demand) * 100.0, 1),
        utilization_rate: round_to(ratio(record.admitted, record.beds) * 100.0, 1),
        mean_los,
    }
}

fn parse_record(columns: &Columns<'_>, record: &StringRecord) -> Result<ServiceRecord, DataError> {
    let week = columns.count(record, "week")?;
    if !(FIRST_WEEK..=LAST_WEEK).contains(&week) {
        return Err(columns.invalid(record, "week", &week.to_string()));
    }
    let percentage = |column: &'static str| -> Result<f64, DataError> {
        let value: f64 = columns.required(record, column)?;
        if (0.0..=100.0).contains(&value) {
            Ok(value)
        } else {
            Err(columns.invalid(record, column, &value.to_string()))
        }
    };
    Ok(ServiceRecord {
        week,
        service: columns.required(record, "service")?,
        event: columns.optional(record, "event")?.unwrap_or_default(),
        beds: columns.count(record, "available_beds")?,
        demand: columns.count(record, "patients_request")?,
        admitted: columns.count(record, "patients_admitted")?,
        refused: columns.count(record, "patients_refused")?,
        satisfaction: percentage("patient_satisfaction")?,
        morale: percentage("staff_morale")?,
    })
}

/// Parse the services table into rows without mean LOS
pub fn read_services<R: Read>(reader: R, nulls: &NullConfig) -> Result<Vec<Row>, DataError> {
    let mut csv = csv_reader(reader);
    let headers = csv.headers()?.clone();
    let columns = Columns::new(TABLE, &headers, &REQUIRED, nulls)?;

    let mut seen = AHashSet::new();
    let mut rows = Vec::new();
    for result in csv.records() {
        let record = result?;
        let parsed = parse_record(&columns, &record)?;
        if !seen.insert((parsed.week, parsed.service)) {
            return Err(DataError::DuplicateKey {
                table: TABLE,
                week: parsed.week,
                service: parsed.service.to_string(),
            });
        }
        rows.push(derive_row(&parsed, None));
    }

    debug!(rows = rows.len(), "read services table");
    Ok(rows)
}

pub fn read_services_file(path: &Path, nulls: &NullConfig) -> Result<Vec<Row>, DataError> {
    read_services(open(path)?, nulls)
}
