//! Alert engine configuration

use std::time::Duration;

/// Tunables for the alert engine
///
/// Defaults match EPA-style monitoring practice: a 15-minute cooldown per
/// alert key, a 50-reading sliding window, and bounded active/history sets.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Minimum time between two alerts sharing the same key
    pub cooldown: Duration,
    /// Sliding window capacity (recent readings kept for detectors)
    pub window_capacity: usize,
    /// Readings required before anomaly detection runs
    pub anomaly_window_size: usize,
    /// Z-score magnitude above which a reading is anomalous
    pub anomaly_std_threshold: f64,
    /// Spread substituted when the baseline stdev is zero or undefined
    pub anomaly_fallback_stdev: f64,
    /// TTL of anomaly alerts
    pub anomaly_ttl: Duration,
    /// Readings required before trend detection runs (split into halves)
    pub trend_window_size: usize,
    /// Percentage increase between window halves that flags a worsening trend
    pub trend_change_threshold_pct: f64,
    /// TTL of trend alerts
    pub trend_ttl: Duration,
    /// Forecast horizon within which a predicted breach is actionable
    pub predictive_lead_time_hours: f64,
    /// Active-set capacity; oldest alerts are evicted past this
    pub max_active_alerts: usize,
    /// History ring capacity
    pub history_capacity: usize,
    /// How long acknowledged alerts stay in the active set
    pub acknowledged_retention: Duration,
    /// TTL of manually created system alerts
    pub system_ttl: Duration,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(15 * 60),
            window_capacity: 50,
            anomaly_window_size: 10,
            anomaly_std_threshold: 3.0,
            anomaly_fallback_stdev: 10.0,
            anomaly_ttl: Duration::from_secs(30 * 60),
            trend_window_size: 20,
            trend_change_threshold_pct: 30.0,
            trend_ttl: Duration::from_secs(60 * 60),
            predictive_lead_time_hours: 2.0,
            max_active_alerts: 50,
            history_capacity: 500,
            acknowledged_retention: Duration::from_secs(60 * 60),
            system_ttl: Duration::from_secs(60 * 60),
        }
    }
}

impl AlertConfig {
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_max_active_alerts(mut self, max: usize) -> Self {
        self.max_active_alerts = max;
        self
    }

    pub fn with_anomaly_window_size(mut self, size: usize) -> Self {
        self.anomaly_window_size = size;
        self
    }

    pub fn with_predictive_lead_time_hours(mut self, hours: f64) -> Self {
        self.predictive_lead_time_hours = hours;
        self
    }
}
