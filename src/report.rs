use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// A report disappears once it is this old.
pub const EXPIRY_WINDOW_MS: i64 = 7_200_000;
/// A report disappears once it collects this many denials.
pub const DENIAL_THRESHOLD: u32 = 3;

pub fn expiry_window() -> TimeDelta {
    TimeDelta::milliseconds(EXPIRY_WINDOW_MS)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum ReportType {
    Obstacle,
    BrokenLift,
    RampBlocked,
    VeryCrowded,
    AccessiblePath,
    Ramp,
    Elevator,
    TactilePaving,
}

impl ReportType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Obstacle => "Obstacle",
            Self::BrokenLift => "Broken Lift",
            Self::RampBlocked => "Ramp Blocked",
            Self::VeryCrowded => "Very Crowded",
            Self::AccessiblePath => "Accessible Path",
            Self::Ramp => "Ramp",
            Self::Elevator => "Elevator",
            Self::TactilePaving => "Tactile Paving",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub id: String,
    pub report_type: ReportType,
    // (lng, lat), same order as the durable record
    pub coordinates: (f64, f64),
    pub timestamp: DateTime<Utc>,
    pub confirmations: u32,
    pub denials: u32,
    pub details: Option<String>,
}

impl Report {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.timestamp >= expiry_window()
    }

    pub fn is_denied(&self) -> bool {
        self.denials >= DENIAL_THRESHOLD
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && !self.is_denied()
    }

    pub fn to_record(&self) -> ReportRecord {
        ReportRecord {
            id: self.id.clone(),
            type_: self.report_type.to_string(),
            label: self.report_type.label().to_string(),
            timestamp: self.timestamp.timestamp_millis(),
            confirmations: self.confirmations,
            denials: self.denials,
            coordinates: [self.coordinates.0, self.coordinates.1],
            details: self.details.clone(),
        }
    }

    pub fn of_record(record: ReportRecord) -> Result<Self> {
        let report_type = ReportType::from_str(&record.type_)
            .map_err(|_| anyhow!("Unknown report type: {}", record.type_))?;
        let timestamp = DateTime::from_timestamp_millis(record.timestamp)
            .ok_or_else(|| anyhow!("Invalid report timestamp: {}", record.timestamp))?;
        Ok(Report {
            id: record.id,
            report_type,
            coordinates: (record.coordinates[0], record.coordinates[1]),
            timestamp,
            confirmations: record.confirmations,
            denials: record.denials,
            details: record.details,
        })
    }
}

/// The durable shape of a report. `label` is written for readers of the raw
/// store and ignored on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub label: String,
    // epoch ms
    pub timestamp: i64,
    #[serde(default)]
    pub confirmations: u32,
    #[serde(default)]
    pub denials: u32,
    pub coordinates: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn type_string_conversion() {
        for type_ in ReportType::iter() {
            assert_eq!(type_, ReportType::from_str(&type_.to_string()).unwrap());
        }
        assert_eq!(ReportType::BrokenLift.to_string(), "broken-lift");
        assert_eq!(ReportType::TactilePaving.to_string(), "tactile-paving");
        assert!(ReportType::from_str("pothole").is_err());
    }

    #[test]
    fn record_json_shape() {
        let report = Report {
            id: "a".to_string(),
            report_type: ReportType::RampBlocked,
            coordinates: (103.85, 1.29),
            timestamp: DateTime::from_timestamp_millis(1_700_000_000_123).unwrap(),
            confirmations: 2,
            denials: 1,
            details: None,
        };
        let json = serde_json::to_value(report.to_record()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "a",
                "type": "ramp-blocked",
                "label": "Ramp Blocked",
                "timestamp": 1_700_000_000_123_i64,
                "confirmations": 2,
                "denials": 1,
                "coordinates": [103.85, 1.29],
            })
        );
        let record: ReportRecord = serde_json::from_value(json).unwrap();
        assert_eq!(Report::of_record(record).unwrap(), report);
    }

    #[test]
    fn liveness() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let mut report = Report {
            id: "a".to_string(),
            report_type: ReportType::Ramp,
            coordinates: (0., 0.),
            timestamp: now - TimeDelta::minutes(119),
            confirmations: 0,
            denials: 2,
            details: Some("north entrance".to_string()),
        };
        assert!(report.is_live(now));
        report.denials = 3;
        assert!(!report.is_live(now));
        report.denials = 0;
        report.timestamp = now - expiry_window();
        assert!(!report.is_live(now));
        report.timestamp = now - expiry_window() + TimeDelta::milliseconds(1);
        assert!(report.is_live(now));
    }
}
