use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single environmental sensor reading
///
/// Readings arrive over HTTP or from the demo simulator. Missing numeric
/// fields deserialize to neutral defaults so a partially formed payload is
/// still processable; in particular a missing `aqi` becomes 0, which falls
/// in the "good" band and triggers nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    /// Store-assigned id, absent until the reading has been ingested
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub gas_resistance: f64,
    #[serde(default)]
    pub aqi: i64,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    /// Bare reading carrying only an AQI value, timestamped now
    pub fn from_aqi(aqi: i64) -> Self {
        Self {
            id: None,
            node_id: None,
            temperature: 0.0,
            humidity: 0.0,
            pressure: None,
            gas_resistance: 0.0,
            aqi,
            timestamp: Utc::now(),
        }
    }
}

/// EPA AQI band
///
/// Six fixed ranges; values above 500 clamp to `Hazardous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiBand {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiBand {
    pub fn from_aqi(aqi: i64) -> Self {
        match aqi {
            i64::MIN..=50 => AqiBand::Good,
            51..=100 => AqiBand::Moderate,
            101..=150 => AqiBand::UnhealthySensitive,
            151..=200 => AqiBand::Unhealthy,
            201..=300 => AqiBand::VeryUnhealthy,
            _ => AqiBand::Hazardous,
        }
    }

    /// Stable key used in cooldown keys and metadata
    pub fn key(&self) -> &'static str {
        match self {
            AqiBand::Good => "good",
            AqiBand::Moderate => "moderate",
            AqiBand::UnhealthySensitive => "unhealthy_sensitive",
            AqiBand::Unhealthy => "unhealthy",
            AqiBand::VeryUnhealthy => "very_unhealthy",
            AqiBand::Hazardous => "hazardous",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiBand::Good => "Good",
            AqiBand::Moderate => "Moderate",
            AqiBand::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            AqiBand::Unhealthy => "Unhealthy",
            AqiBand::VeryUnhealthy => "Very Unhealthy",
            AqiBand::Hazardous => "Hazardous",
        }
    }

    /// EPA display color for dashboards
    pub fn color(&self) -> &'static str {
        match self {
            AqiBand::Good => "#00e400",
            AqiBand::Moderate => "#ffff00",
            AqiBand::UnhealthySensitive => "#ff7e00",
            AqiBand::Unhealthy => "#ff0000",
            AqiBand::VeryUnhealthy => "#8f3f97",
            AqiBand::Hazardous => "#7e0023",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            AqiBand::Good => "Air quality is satisfactory. Enjoy outdoor activities!",
            AqiBand::Moderate => {
                "Air quality is acceptable. Sensitive individuals should limit prolonged outdoor exertion."
            }
            AqiBand::UnhealthySensitive => {
                "People with respiratory conditions should reduce outdoor activity."
            }
            AqiBand::Unhealthy => {
                "Everyone may experience health effects. Limit outdoor exertion."
            }
            AqiBand::VeryUnhealthy => "Health alert! Everyone should avoid outdoor activities.",
            AqiBand::Hazardous => "Emergency conditions! Stay indoors with air filtration.",
        }
    }
}
