//! Alert entity and wire types

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of condition raised the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Threshold,
    Predictive,
    Anomaly,
    System,
    Trend,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Threshold => "threshold",
            AlertKind::Predictive => "predictive",
            AlertKind::Anomaly => "anomaly",
            AlertKind::System => "system",
            AlertKind::Trend => "trend",
        }
    }
}

/// Alert severity, ordered from least to most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
    Emergency,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
            AlertSeverity::Emergency => "emergency",
        }
    }
}

/// A raised alert
///
/// Immutable after creation except for `acknowledged`, which only ever
/// flips false to true. The monotonic instants mirror `created_at` /
/// `expires_at` and are what cleanup actually compares against, so expiry
/// is immune to wall-clock adjustments.
#[derive(Debug, Clone)]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub reading_id: Option<i64>,
    pub aqi_value: Option<i64>,
    pub acknowledged: bool,
    pub auto_dismiss: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub(crate) created_mono: Instant,
    pub(crate) expires_mono: Option<Instant>,
}

impl Alert {
    /// Flat serializable record, instants rendered as ISO-8601
    pub fn to_dto(&self) -> AlertDto {
        AlertDto {
            id: self.id.clone(),
            kind: self.kind,
            severity: self.severity,
            title: self.title.clone(),
            message: self.message.clone(),
            created_at: self.created_at.to_rfc3339(),
            reading_id: self.reading_id,
            aqi_value: self.aqi_value,
            acknowledged: self.acknowledged,
            auto_dismiss: self.auto_dismiss,
            expires_at: self.expires_at.map(|t| t.to_rfc3339()),
            metadata: self.metadata.clone(),
        }
    }
}

/// Serialized alert as exposed over the API and to persistence sinks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub created_at: String,
    pub reading_id: Option<i64>,
    pub aqi_value: Option<i64>,
    pub acknowledged: bool,
    pub auto_dismiss: bool,
    pub expires_at: Option<String>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Unacknowledged active alert counts, broken down by severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    pub total: usize,
    pub info: usize,
    pub warning: usize,
    pub critical: usize,
    pub emergency: usize,
}

impl AlertCounts {
    pub(crate) fn record(&mut self, severity: AlertSeverity) {
        self.total += 1;
        match severity {
            AlertSeverity::Info => self.info += 1,
            AlertSeverity::Warning => self.warning += 1,
            AlertSeverity::Critical => self.critical += 1,
            AlertSeverity::Emergency => self.emergency += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(AlertSeverity::Info < AlertSeverity::Warning);
        assert!(AlertSeverity::Warning < AlertSeverity::Critical);
        assert!(AlertSeverity::Critical < AlertSeverity::Emergency);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AlertSeverity::Emergency).unwrap(),
            r#""emergency""#
        );
        assert_eq!(
            serde_json::to_string(&AlertKind::Threshold).unwrap(),
            r#""threshold""#
        );
    }

    #[test]
    fn test_dto_kind_wire_name() {
        let dto = AlertDto {
            id: "alert_1".into(),
            kind: AlertKind::System,
            severity: AlertSeverity::Info,
            title: "t".into(),
            message: "m".into(),
            created_at: "2026-01-01T00:00:00+00:00".into(),
            reading_id: None,
            aqi_value: None,
            acknowledged: false,
            auto_dismiss: true,
            expires_at: None,
            metadata: serde_json::Map::new(),
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["type"], "system");
    }
}
