//! In-memory storage for readings and persisted alerts
//!
//! Bounded ring buffers guarded by `parking_lot::RwLock`. Durable storage
//! is intentionally out of scope; anything that needs to outlive the
//! process goes through the `AlertSink` seam.

use std::collections::VecDeque;

use parking_lot::RwLock;
use serde::Serialize;

use crate::alerts::{AlertDto, AlertSink, SinkError};
use crate::data::Reading;

/// Bounded store of recent readings with id assignment and aggregates
pub struct ReadingStore {
    state: RwLock<StoreState>,
    capacity: usize,
}

struct StoreState {
    readings: VecDeque<Reading>,
    next_id: i64,
}

/// Aggregate statistics over stored readings
#[derive(Debug, Clone, Serialize)]
pub struct ReadingStats {
    pub period_hours: i64,
    pub reading_count: usize,
    pub temperature: FieldStats,
    pub humidity: FieldStats,
    pub aqi: FieldStats,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl ReadingStore {
    pub const DEFAULT_CAPACITY: usize = 5000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: RwLock::new(StoreState {
                readings: VecDeque::with_capacity(capacity.min(1024)),
                next_id: 1,
            }),
            capacity,
        }
    }

    /// Store a reading, assigning it a fresh id; returns the stored copy
    pub fn insert(&self, mut reading: Reading) -> Reading {
        let mut state = self.state.write();
        reading.id = Some(state.next_id);
        state.next_id += 1;

        if state.readings.len() == self.capacity {
            state.readings.pop_front();
        }
        state.readings.push_back(reading.clone());
        reading
    }

    pub fn latest(&self) -> Option<Reading> {
        self.state.read().readings.back().cloned()
    }

    /// Up to `limit` most recent readings, newest first
    pub fn recent(&self, limit: usize) -> Vec<Reading> {
        let state = self.state.read();
        state.readings.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().readings.is_empty()
    }

    /// Count plus avg/min/max for temperature, humidity and AQI over the
    /// last `hours` hours
    pub fn stats(&self, hours: i64) -> ReadingStats {
        let since = chrono::Utc::now() - chrono::Duration::hours(hours);
        let state = self.state.read();

        let mut count = 0usize;
        let mut temperature = Accumulator::new();
        let mut humidity = Accumulator::new();
        let mut aqi = Accumulator::new();

        for reading in state.readings.iter().filter(|r| r.timestamp > since) {
            count += 1;
            temperature.push(reading.temperature);
            humidity.push(reading.humidity);
            aqi.push(reading.aqi as f64);
        }

        ReadingStats {
            period_hours: hours,
            reading_count: count,
            temperature: temperature.finish(1),
            humidity: humidity.finish(1),
            aqi: aqi.finish(0),
        }
    }
}

impl Default for ReadingStore {
    fn default() -> Self {
        Self::new()
    }
}

struct Accumulator {
    sum: f64,
    min: f64,
    max: f64,
    count: usize,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            count: 0,
        }
    }

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
    }

    fn finish(self, decimals: u32) -> FieldStats {
        if self.count == 0 {
            return FieldStats::default();
        }
        let scale = 10f64.powi(decimals as i32);
        let round = |v: f64| (v * scale).round() / scale;
        FieldStats {
            avg: round(self.sum / self.count as f64),
            min: round(self.min),
            max: round(self.max),
        }
    }
}

/// Bounded in-memory log of persisted alerts
///
/// Stands in for a durable alerts table behind the `AlertSink` seam; the
/// API exposes it so recently fired alerts survive dismissal.
pub struct AlertLog {
    entries: RwLock<VecDeque<AlertDto>>,
    capacity: usize,
}

impl AlertLog {
    pub const DEFAULT_CAPACITY: usize = 500;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Up to `limit` most recent entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<AlertDto> {
        let entries = self.entries.read();
        entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSink for AlertLog {
    fn save(&self, alert: &AlertDto) -> Result<(), SinkError> {
        let mut entries = self.entries.write();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(alert.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertKind, AlertSeverity};

    fn reading(aqi: i64, temperature: f64) -> Reading {
        let mut r = Reading::from_aqi(aqi);
        r.temperature = temperature;
        r.humidity = 50.0;
        r
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let store = ReadingStore::new();
        let a = store.insert(reading(40, 20.0));
        let b = store.insert(reading(45, 21.0));
        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
        assert_eq!(store.latest().unwrap().id, Some(2));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = ReadingStore::with_capacity(3);
        for i in 0..5 {
            store.insert(reading(i, 20.0));
        }
        assert_eq!(store.len(), 3);
        let recent = store.recent(10);
        assert_eq!(recent[0].aqi, 4);
        assert_eq!(recent[2].aqi, 2);
    }

    #[test]
    fn test_stats() {
        let store = ReadingStore::new();
        store.insert(reading(40, 20.0));
        store.insert(reading(60, 22.0));
        store.insert(reading(80, 24.0));

        let stats = store.stats(24);
        assert_eq!(stats.reading_count, 3);
        assert_eq!(stats.aqi.avg, 60.0);
        assert_eq!(stats.aqi.min, 40.0);
        assert_eq!(stats.aqi.max, 80.0);
        assert_eq!(stats.temperature.avg, 22.0);
    }

    #[test]
    fn test_stats_empty_store() {
        let store = ReadingStore::new();
        let stats = store.stats(24);
        assert_eq!(stats.reading_count, 0);
        assert_eq!(stats.aqi.avg, 0.0);
    }

    #[test]
    fn test_alert_log_bounded() {
        let log = AlertLog::with_capacity(2);
        for i in 0..4 {
            let dto = AlertDto {
                id: format!("alert_{}", i),
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
            log.save(&dto).unwrap();
        }
        assert_eq!(log.len(), 2);
        let recent = log.recent(10);
        assert_eq!(recent[0].id, "alert_3");
        assert_eq!(recent[1].id, "alert_2");
    }
}
