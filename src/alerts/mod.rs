//! Alert evaluation and lifecycle
//!
//! Every incoming reading is pushed into a sliding window and run through
//! the threshold, anomaly and trend detectors; forecasts go through the
//! predictive detector. Detections that pass per-key cooldowns become
//! alerts, which live in a bounded active set (with expiry, acknowledged
//! aging and capacity eviction) and a fixed-capacity history ring, and are
//! fanned out to registered observers.

pub mod config;
pub mod cooldown;
pub mod detectors;
pub mod engine;
pub mod notify;
pub mod types;
pub mod window;

pub use config::AlertConfig;
pub use cooldown::CooldownTracker;
pub use engine::AlertEngine;
pub use notify::{AlertObserver, AlertSink, LogObserver, NotifyError, SinkError, WebhookObserver};
pub use types::{Alert, AlertCounts, AlertDto, AlertKind, AlertSeverity};
pub use window::ReadingWindow;
