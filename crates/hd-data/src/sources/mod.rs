//! CSV readers for the source tables

pub mod patients;
pub mod services;
pub mod staff;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use ahash::AHashMap;
use csv::{ReaderBuilder, StringRecord};

use crate::config::NullConfig;
use crate::DataError;

pub use patients::{mean_los_by_week, read_patients, read_patients_file, PatientStay};
pub use services::{derive_row, read_services, read_services_file, ServiceRecord};
pub use staff::{
    read_schedule, read_schedule_file, read_staff, read_staff_file, StaffId, StaffMember, StaffRole, StaffShift,
};

pub(crate) fn open(path: &Path) -> Result<BufReader<File>, DataError> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(DataError::MissingFile(path.to_path_buf())),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader)
}

/// Header lookup for one table plus null-aware cell parsing
pub(crate) struct Columns<'a> {
    table: &'static str,
    index: AHashMap<String, usize>,
    nulls: &'a NullConfig,
}

impl<'a> Columns<'a> {
    pub fn new(
        table: &'static str,
        headers: &StringRecord,
        required: &[&'static str],
        nulls: &'a NullConfig,
    ) -> Result<Self, DataError> {
        let index: AHashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        if let Some(column) = required.iter().find(|c| !index.contains_key(**c)) {
            return Err(DataError::MissingColumn { table, column });
        }
        Ok(Self { table, index, nulls })
    }

    /// Cell content, `None` when absent or a null token
    pub fn cell<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        let raw = self.index.get(column).and_then(|&i| record.get(i));
        self.nulls.value(raw)
    }

    pub fn required<T: FromStr>(&self, record: &StringRecord, column: &'static str) -> Result<T, DataError> {
        match self.cell(record, column) {
            Some(raw) => raw.parse().map_err(|_| self.invalid(record, column, raw)),
            None => Err(self.invalid(record, column, record_value(record, self.index.get(column)))),
        }
    }

    pub fn optional<T: FromStr>(&self, record: &StringRecord, column: &'static str) -> Result<Option<T>, DataError> {
        self.cell(record, column)
            .map(|raw| raw.parse().map_err(|_| self.invalid(record, column, raw)))
            .transpose()
    }

    /// Non-negative whole number, tolerating a trailing `.0`
    pub fn count(&self, record: &StringRecord, column: &'static str) -> Result<u32, DataError> {
        let raw = self.cell(record, column).unwrap_or_default();
        parse_count(raw).ok_or_else(|| self.invalid(record, column, raw))
    }

    pub fn invalid(&self, record: &StringRecord, column: &'static str, value: &str) -> DataError {
        DataError::Parse {
            table: self.table,
            line: line_of(record),
            column,
            value: value.to_string(),
        }
    }
}

fn record_value<'r>(record: &'r StringRecord, index: Option<&usize>) -> &'r str {
    index.and_then(|&i| record.get(i)).unwrap_or_default()
}

pub(crate) fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

/// Integer column that may be written with a trailing `.0`
pub(crate) fn parse_count(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().or_else(|| {
        let value = raw.parse::<f64>().ok()?;
        (value.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&value)).then_some(value as u32)
    })
}
