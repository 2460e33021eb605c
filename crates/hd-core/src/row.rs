//! Weekly service records and their identity

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// First week of the reporting year
pub const FIRST_WEEK: u32 = 1;

/// Last week of the reporting year
pub const LAST_WEEK: u32 = 52;

/// Hospital service (department)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Service {
    #[serde(rename = "emergency")]
    Emergency,
    #[serde(rename = "surgery")]
    Surgery,
    #[serde(rename = "general_medicine")]
    GeneralMedicine,
    #[serde(rename = "ICU")]
    Icu,
}

impl Service {
    /// All services in display order
    pub const ALL: [Service; 4] = [
        Service::Emergency,
        Service::Surgery,
        Service::GeneralMedicine,
        Service::Icu,
    ];

    /// Name used in source tables
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Emergency => "emergency",
            Service::Surgery => "surgery",
            Service::GeneralMedicine => "general_medicine",
            Service::Icu => "ICU",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Service::Emergency => "Emergency",
            Service::Surgery => "Surgery",
            Service::GeneralMedicine => "General Medicine",
            Service::Icu => "ICU",
        }
    }

    /// Compact label for tight legends
    pub fn short_label(&self) -> &'static str {
        match self {
            Service::Emergency => "ER",
            Service::Surgery => "Surg",
            Service::GeneralMedicine => "Gen Med",
            Service::Icu => "ICU",
        }
    }

    /// Color shared by every view
    pub fn color(&self) -> &'static str {
        match self {
            Service::Emergency => "#e74c3c",
            Service::Surgery => "#3498db",
            Service::GeneralMedicine => "#27ae60",
            Service::Icu => "#9b59b6",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized service or event name
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownName {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Service {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Service::ALL
            .iter()
            .copied()
            .find(|service| service.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownName {
                kind: "service",
                value: trimmed.to_string(),
            })
    }
}

/// Event tag attached to a service week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekEvent {
    #[default]
    None,
    Flu,
    Strike,
    Donation,
}

impl WeekEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekEvent::None => "none",
            WeekEvent::Flu => "flu",
            WeekEvent::Strike => "strike",
            WeekEvent::Donation => "donation",
        }
    }

    /// Whether the week carries a notable event
    pub fn is_marked(&self) -> bool {
        !matches!(self, WeekEvent::None)
    }

    pub fn label(&self) -> Option<&'static str> {
        match self {
            WeekEvent::None => None,
            WeekEvent::Flu => Some("Flu Outbreak"),
            WeekEvent::Strike => Some("Staff Strike"),
            WeekEvent::Donation => Some("Equipment Donation"),
        }
    }
}

impl FromStr for WeekEvent {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(WeekEvent::None),
            "flu" => Ok(WeekEvent::Flu),
            "strike" => Ok(WeekEvent::Strike),
            "donation" => Ok(WeekEvent::Donation),
            other => Err(UnknownName {
                kind: "event",
                value: other.to_string(),
            }),
        }
    }
}

/// Identity of a row across every view and filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey {
    pub week: u32,
    pub service: Service,
}

impl RowKey {
    pub fn new(week: u32, service: Service) -> Self {
        Self { week, service }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}/{}", self.week, self.service)
    }
}

/// Numeric attribute a brush box or plot axis can be drawn against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Week,
    Beds,
    Demand,
    Admitted,
    Refused,
    Satisfaction,
    Morale,
    PressureIndex,
    AcceptanceRate,
    RefusalRate,
    UtilizationRate,
    MeanLos,
}

impl Dimension {
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Week => "Week",
            Dimension::Beds => "Beds",
            Dimension::Demand => "Requests",
            Dimension::Admitted => "Admitted",
            Dimension::Refused => "Refused",
            Dimension::Satisfaction => "Satisfaction",
            Dimension::Morale => "Morale",
            Dimension::PressureIndex => "Pressure idx",
            Dimension::AcceptanceRate => "Accept (%)",
            Dimension::RefusalRate => "Refusal (%)",
            Dimension::UtilizationRate => "Util (%)",
            Dimension::MeanLos => "LOS (days)",
        }
    }

    /// Fixed axis bounds for percentage-like attributes
    pub fn fixed_range(&self) -> Option<[f64; 2]> {
        match self {
            Dimension::Week => Some([FIRST_WEEK as f64, LAST_WEEK as f64]),
            Dimension::Satisfaction
            | Dimension::Morale
            | Dimension::AcceptanceRate
            | Dimension::RefusalRate => Some([0.0, 100.0]),
            _ => None,
        }
    }
}

/// One service-week record. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub week: u32,
    pub service: Service,
    pub event: WeekEvent,
    pub beds: u32,
    pub demand: u32,
    pub admitted: u32,
    pub refused: u32,
    pub satisfaction: f64,
    pub morale: f64,
    pub pressure_index: f64,
    pub acceptance_rate: f64,
    pub refusal_rate: f64,
    pub utilization_rate: f64,
    pub mean_los: Option<f64>,
}

impl Row {
    pub fn key(&self) -> RowKey {
        RowKey::new(self.week, self.service)
    }

    /// Value of a numeric attribute; `None` only for a missing mean LOS
    pub fn value(&self, dimension: Dimension) -> Option<f64> {
        let value = match dimension {
            Dimension::Week => self.week as f64,
            Dimension::Beds => self.beds as f64,
            Dimension::Demand => self.demand as f64,
            Dimension::Admitted => self.admitted as f64,
            Dimension::Refused => self.refused as f64,
            Dimension::Satisfaction => self.satisfaction,
            Dimension::Morale => self.morale,
            Dimension::PressureIndex => self.pressure_index,
            Dimension::AcceptanceRate => self.acceptance_rate,
            Dimension::RefusalRate => self.refusal_rate,
            Dimension::UtilizationRate => self.utilization_rate,
            Dimension::MeanLos => return self.mean_los,
        };
        Some(value)
    }

    /// Net capacity (beds minus demand); negative means overload
    pub fn net_capacity(&self) -> f64 {
        self.beds as f64 - self.demand as f64
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_round_trips_source_names() {
        for service in Service::ALL {
            assert_eq!(service.as_str().parse::<Service>().unwrap(), service);
        }
        assert_eq!("icu".parse::<Service>().unwrap(), Service::Icu);
        assert!("cardiology".parse::<Service>().is_err());
    }

    #[test]
    fn test_week_event_parsing() {
        assert_eq!("".parse::<WeekEvent>().unwrap(), WeekEvent::None);
        assert_eq!("Flu".parse::<WeekEvent>().unwrap(), WeekEvent::Flu);
        assert!(!WeekEvent::None.is_marked());
        assert!(WeekEvent::Strike.is_marked());
    }

    #[test]
    fn test_missing_los_has_no_value() {
        let mut row = fixtures::row(3, Service::Surgery, 1.1);
        row.mean_los = None;
        assert_eq!(row.value(Dimension::MeanLos), None);
        assert_eq!(row.value(Dimension::Week), Some(3.0));
        assert_eq!(row.value(Dimension::PressureIndex), Some(1.1));
    }

    #[test]
    fn test_row_key_serializes_with_source_names() {
        let key = RowKey::new(12, Service::GeneralMedicine);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"week":12,"service":"general_medicine"}"#);
    }
}
