//! Patient stays and the weekly mean length of stay

use std::io::Read;
use std::path::Path;

use ahash::AHashMap;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use hd_core::{RowKey, Service};
use rayon::prelude::*;
use tracing::{debug, warn};

use super::{csv_reader, open, Columns};
use crate::config::NullConfig;
use crate::DataError;

const TABLE: &str = "patients";

const REQUIRED: [&str; 4] = ["patient_id", "arrival_date", "departure_date", "service"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// One hospital stay
#[derive(Debug, Clone, PartialEq)]
pub struct PatientStay {
    pub patient_id: String,
    pub service: Service,
    pub arrival: NaiveDateTime,
    /// Still admitted when absent
    pub departure: Option<NaiveDateTime>,
}

impl PatientStay {
    /// Whole days between arrival and departure
    pub fn length_of_stay(&self) -> Option<i64> {
        let days = (self.departure? - self.arrival).num_days();
        (days >= 0).then_some(days)
    }

    /// ISO week of the arrival date
    pub fn arrival_week(&self) -> u32 {
        self.arrival.date().iso_week().week()
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

fn parse_stay(columns: &Columns<'_>, record: &StringRecord) -> Result<PatientStay, DataError> {
    let timestamp = |column: &'static str| -> Result<Option<NaiveDateTime>, DataError> {
        columns
            .cell(record, column)
            .map(|raw| parse_timestamp(raw).ok_or_else(|| columns.invalid(record, column, raw)))
            .transpose()
    };
    let arrival = timestamp("arrival_date")?
        .ok_or_else(|| columns.invalid(record, "arrival_date", ""))?;
    Ok(PatientStay {
        patient_id: columns.required(record, "patient_id")?,
        service: columns.required(record, "service")?,
        arrival,
        departure: timestamp("departure_date")?,
    })
}

pub fn read_patients<R: Read>(reader: R, nulls: &NullConfig) -> Result<Vec<PatientStay>, DataError> {
    let mut csv = csv_reader(reader);
    let headers = csv.headers()?.clone();
    let columns = Columns::new(TABLE, &headers, &REQUIRED, nulls)?;

    let stays = csv
        .records()
        .map(|result| parse_stay(&columns, &result?))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(stays = stays.len(), "read patients table");
    Ok(stays)
}

pub fn read_patients_file(path: &Path, nulls: &NullConfig) -> Result<Vec<PatientStay>, DataError> {
    read_patients(open(path)?, nulls)
}

/// Mean length of stay per (service, ISO arrival week). Stays without a
/// usable departure are left out.
pub fn mean_los_by_week(stays: &[PatientStay]) -> AHashMap<RowKey, f64> {
    let totals = stays
        .par_iter()
        .filter_map(|stay| {
            let days = stay.length_of_stay()?;
            Some((RowKey::new(stay.arrival_week(), stay.service), days as f64))
        })
        .fold(AHashMap::new, |mut acc: AHashMap<RowKey, (f64, u32)>, (key, days)| {
            let entry = acc.entry(key).or_insert((0.0, 0));
            entry.0 += days;
            entry.1 += 1;
            acc
        })
        .reduce(AHashMap::new, |mut left, right| {
            for (key, (sum, count)) in right {
                let entry = left.entry(key).or_insert((0.0, 0));
                entry.0 += sum;
                entry.1 += count;
            }
            left
        });

    let skipped = stays.iter().filter(|s| s.length_of_stay().is_none()).count();
    if skipped > 0 {
        warn!(skipped, "patient stays without a usable length of stay");
    }

    totals
        .into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}
