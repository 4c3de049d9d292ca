//! Airwatch: Real-Time Air Quality Monitoring and Alerting
//!
//! Ingests a stream of environmental sensor readings (temperature,
//! humidity, gas resistance, derived AQI) plus periodic AQI forecasts, and
//! raises deduplicated, rate-limited, expiring alerts when a human-relevant
//! condition exists.
//!
//! # Features
//!
//! - **Threshold Alerts**: EPA AQI bands with severity-graded alerts
//! - **Anomaly Detection**: z-score outliers over a sliding reading window
//! - **Trend Detection**: sustained deterioration across recent readings
//! - **Predictive Alerts**: near-term forecast breaches, before they happen
//! - **Rate Limiting**: independent per-key cooldowns prevent alert spam
//! - **Alert Lifecycle**: bounded active set with expiry, acknowledged
//!   aging and capacity eviction, plus a fixed-capacity history ring
//! - **Notification Fan-Out**: log/webhook observers with failure isolation
//! - **Demo Simulator**: realistic simulated sensor data, no hardware needed
//!
//! # Example
//!
//! ```no_run
//! use airwatch::alerts::{AlertConfig, AlertEngine};
//! use airwatch::data::Reading;
//!
//! let engine = AlertEngine::new(AlertConfig::default());
//!
//! // An unhealthy reading raises a threshold alert
//! let alerts = engine.process_reading(&Reading::from_aqi(180));
//! assert_eq!(alerts.len(), 1);
//!
//! // The same band stays quiet while its cooldown holds
//! let alerts = engine.process_reading(&Reading::from_aqi(185));
//! assert!(alerts.is_empty());
//! ```

pub mod alerts;
pub mod api;
pub mod clock;
pub mod data;
pub mod sim;
pub mod storage;

// Re-export commonly used types
pub use alerts::{Alert, AlertConfig, AlertCounts, AlertDto, AlertEngine, AlertKind, AlertSeverity};
pub use clock::{Clock, ManualClock, SystemClock};
pub use data::{AqiBand, Forecast, ForecastPoint, Reading};
