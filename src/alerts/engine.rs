//! Alert engine: evaluation, lifecycle and queries
//!
//! All mutable state (sliding window, cooldowns, active set, history ring,
//! id counter) lives behind a single mutex so evaluation-and-creation is
//! atomic with respect to concurrent readers: a reader never observes a
//! partially updated active list or a duplicate id. Observer fan-out runs
//! after the lock is released.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use parking_lot::Mutex;

use super::config::AlertConfig;
use super::cooldown::CooldownTracker;
use super::detectors::{self, Detection};
use super::notify::{AlertObserver, AlertSink, Dispatcher};
use super::types::{Alert, AlertCounts, AlertDto, AlertKind, AlertSeverity};
use super::window::ReadingWindow;
use crate::clock::{Clock, SystemClock};
use crate::data::{Forecast, Reading};

struct EngineState {
    window: ReadingWindow,
    cooldowns: CooldownTracker,
    active: Vec<Alert>,
    history: VecDeque<Alert>,
    alert_counter: u64,
}

/// The alert engine
///
/// Construct one per process (or per test) and share it via `Arc`; there is
/// no global instance.
pub struct AlertEngine {
    state: Mutex<EngineState>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
    config: AlertConfig,
}

impl AlertEngine {
    pub fn new(config: AlertConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: AlertConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(EngineState {
                window: ReadingWindow::new(config.window_capacity),
                cooldowns: CooldownTracker::new(config.cooldown),
                active: Vec::new(),
                history: VecDeque::with_capacity(config.history_capacity),
                alert_counter: 0,
            }),
            dispatcher: Dispatcher::new(),
            clock,
            config,
        }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Register an observer for new-alert fan-out
    pub fn register_observer(&self, observer: Arc<dyn AlertObserver>) {
        self.dispatcher.register(observer);
    }

    /// Install the optional persistence hook
    pub fn set_sink(&self, sink: Arc<dyn AlertSink>) {
        self.dispatcher.set_sink(sink);
    }

    /// Run a reading through the threshold, anomaly and trend detectors
    ///
    /// The reading is pushed into the sliding window first, then each
    /// detector runs against the updated window. Returns any alerts raised.
    pub fn process_reading(&self, reading: &Reading) -> Vec<Alert> {
        let now = self.clock.now();
        let alerts = {
            let mut state = self.state.lock();
            state.window.push(reading.clone());

            let mut detections: Vec<Detection> = Vec::new();
            {
                let EngineState {
                    window, cooldowns, ..
                } = &mut *state;
                if let Some(d) = detectors::check_threshold(cooldowns, now, reading.aqi, reading.id)
                {
                    detections.push(d);
                }
                if let Some(d) = detectors::check_anomaly(&self.config, window, cooldowns, now) {
                    detections.push(d);
                }
                if let Some(d) = detectors::check_trend(&self.config, window, cooldowns, now) {
                    detections.push(d);
                }
            }

            detections
                .into_iter()
                .map(|d| self.create_locked(&mut state, d))
                .collect::<Vec<_>>()
        };

        self.dispatch_all(&alerts);
        alerts
    }

    /// Scan a forecast for near-term predicted breaches
    pub fn process_forecast(&self, forecast: &Forecast) -> Vec<Alert> {
        let now = self.clock.now();
        let alerts = {
            let mut state = self.state.lock();
            detectors::check_forecast(&self.config, &mut state.cooldowns, now, forecast)
                .map(|d| self.create_locked(&mut state, d))
                .into_iter()
                .collect::<Vec<_>>()
        };

        self.dispatch_all(&alerts);
        alerts
    }

    /// Manually raise a system alert (sensor trouble, operator notices, ...)
    pub fn create_system_alert(
        &self,
        title: &str,
        message: &str,
        severity: AlertSeverity,
    ) -> Alert {
        let detection = Detection {
            kind: AlertKind::System,
            severity,
            title: title.to_string(),
            message: message.to_string(),
            reading_id: None,
            aqi_value: None,
            auto_dismiss: true,
            expires_in: Some(self.config.system_ttl),
            metadata: serde_json::Map::new(),
        };

        let alert = {
            let mut state = self.state.lock();
            self.create_locked(&mut state, detection)
        };
        self.dispatch_all(std::slice::from_ref(&alert));
        alert
    }

    /// Mark an active alert acknowledged; returns whether it was found
    pub fn acknowledge(&self, alert_id: &str) -> bool {
        let mut state = self.state.lock();
        match state.active.iter_mut().find(|a| a.id == alert_id) {
            Some(alert) => {
                alert.acknowledged = true;
                true
            }
            None => false,
        }
    }

    /// Remove an alert from the active set; idempotent, always true
    ///
    /// History is untouched: dismissed alerts remain visible there until
    /// the ring evicts them.
    pub fn dismiss(&self, alert_id: &str) -> bool {
        let mut state = self.state.lock();
        state.active.retain(|a| a.id != alert_id);
        true
    }

    /// Active alerts, optionally including acknowledged ones
    pub fn active_alerts(&self, include_acknowledged: bool) -> Vec<AlertDto> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        Self::cleanup(&self.config, &mut state, now);
        state
            .active
            .iter()
            .filter(|a| include_acknowledged || !a.acknowledged)
            .map(Alert::to_dto)
            .collect()
    }

    /// Unacknowledged active counts broken down by severity
    pub fn counts(&self) -> AlertCounts {
        let now = self.clock.now();
        let mut state = self.state.lock();
        Self::cleanup(&self.config, &mut state, now);

        let mut counts = AlertCounts::default();
        for alert in state.active.iter().filter(|a| !a.acknowledged) {
            counts.record(alert.severity);
        }
        counts
    }

    /// Most recent alerts from the history ring, newest last
    pub fn recent_history(&self, limit: usize) -> Vec<AlertDto> {
        let state = self.state.lock();
        let skip = state.history.len().saturating_sub(limit);
        state.history.iter().skip(skip).map(Alert::to_dto).collect()
    }

    /// Turn a detection into a stored alert; caller holds the state lock
    fn create_locked(&self, state: &mut EngineState, detection: Detection) -> Alert {
        let created_mono = self.clock.now();
        let created_at = self.clock.wall_now();

        state.alert_counter += 1;
        let id = format!(
            "alert_{}_{}",
            created_at.format("%Y%m%d%H%M%S"),
            state.alert_counter
        );

        let expires_at = detection.expires_in.and_then(|ttl| {
            ChronoDuration::from_std(ttl)
                .ok()
                .map(|ttl| created_at + ttl)
        });
        let expires_mono = detection.expires_in.map(|ttl| created_mono + ttl);

        let alert = Alert {
            id,
            kind: detection.kind,
            severity: detection.severity,
            title: detection.title,
            message: detection.message,
            created_at,
            reading_id: detection.reading_id,
            aqi_value: detection.aqi_value,
            acknowledged: false,
            auto_dismiss: detection.auto_dismiss,
            expires_at,
            metadata: detection.metadata,
            created_mono,
            expires_mono,
        };

        state.active.push(alert.clone());
        if state.history.len() == self.config.history_capacity {
            state.history.pop_front();
        }
        state.history.push_back(alert.clone());

        Self::cleanup(&self.config, state, created_mono);

        tracing::info!(
            alert_id = %alert.id,
            kind = alert.kind.as_str(),
            severity = alert.severity.as_str(),
            "Alert created: {}",
            alert.title
        );

        alert
    }

    /// Expire, age out acknowledged alerts, and enforce the active cap
    ///
    /// Runs on every creation and before every active read; staleness is
    /// bounded by caller activity, not a background timer.
    fn cleanup(config: &AlertConfig, state: &mut EngineState, now: std::time::Instant) {
        state
            .active
            .retain(|a| a.expires_mono.map_or(true, |deadline| deadline > now));

        state.active.retain(|a| {
            !a.acknowledged || now.duration_since(a.created_mono) <= config.acknowledged_retention
        });

        if state.active.len() > config.max_active_alerts {
            let excess = state.active.len() - config.max_active_alerts;
            state.active.drain(..excess);
        }
    }

    fn dispatch_all(&self, alerts: &[Alert]) {
        for alert in alerts {
            self.dispatcher.dispatch(&alert.to_dto());
        }
    }
}
