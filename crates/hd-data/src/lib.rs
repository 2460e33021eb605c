//! Loading, derivation and filtering of the dashboard tables

pub mod cache;
pub mod config;
pub mod pipeline;
pub mod sources;
pub mod store;

use std::path::PathBuf;

use thiserror::Error;
use tokio::task::JoinError;

// Re-exports
pub use cache::{CacheStats, FilterCache};
pub use config::{DashboardConfig, NullConfig};
pub use pipeline::FilterPipeline;
pub use sources::{PatientStay, StaffId, StaffMember, StaffRole, StaffShift};
pub use store::Dataset;

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("{table} line {line}: invalid value {value:?} in column `{column}`")]
    Parse {
        table: &'static str,
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("{table}: missing column `{column}`")]
    MissingColumn { table: &'static str, column: &'static str },

    #[error("{table}: duplicate row for week {week} / {service}")]
    DuplicateKey {
        table: &'static str,
        week: u32,
        service: String,
    },

    #[error("required file not found: {0}")]
    MissingFile(PathBuf),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(error: serde_json::Error) -> Self {
        DataError::Config(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
