use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One predicted AQI value at a future point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub aqi: i64,
    /// Forecast horizon in hours, relative to when the forecast was made
    #[serde(default)]
    pub hours_ahead: f64,
}

/// An ordered AQI forecast, points sorted by increasing `hours_ahead`
///
/// The wire field is named `forecast` to match the forecasting
/// collaborator's payload. A missing or empty array deserializes to an
/// empty forecast, which simply produces no alerts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(rename = "forecast", default)]
    pub points: Vec<ForecastPoint>,
    #[serde(default)]
    pub model: Option<String>,
}
