//! Condition detectors
//!
//! Each detector is a pure, bounded-time check over the sliding window and
//! cooldown state. A detector either returns a `Detection` (condition
//! present and off cooldown) or `None`; insufficient data is never an
//! error, it just skips evaluation.

use std::time::{Duration, Instant};

use serde_json::{json, Map, Value};

use super::config::AlertConfig;
use super::cooldown::CooldownTracker;
use super::types::{AlertKind, AlertSeverity};
use super::window::ReadingWindow;
use crate::data::{AqiBand, Forecast};

/// A condition that passed its cooldown and should become an alert
#[derive(Debug)]
pub(crate) struct Detection {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub reading_id: Option<i64>,
    pub aqi_value: Option<i64>,
    pub auto_dismiss: bool,
    pub expires_in: Option<Duration>,
    pub metadata: Map<String, Value>,
}

/// Threshold check: raise when the AQI band is concerning
///
/// Only bands at or above unhealthy-for-sensitive alert. Threshold alerts
/// reflect an ongoing condition, so they carry no TTL and persist until
/// acknowledged, dismissed or evicted.
pub(crate) fn check_threshold(
    cooldowns: &mut CooldownTracker,
    now: Instant,
    aqi: i64,
    reading_id: Option<i64>,
) -> Option<Detection> {
    let band = AqiBand::from_aqi(aqi);

    let (severity, title, message) = match band {
        AqiBand::Good | AqiBand::Moderate => return None,
        AqiBand::UnhealthySensitive => (
            AlertSeverity::Warning,
            "Unhealthy for Sensitive Groups",
            "Air quality is unhealthy for sensitive groups. People with respiratory conditions should limit outdoor activities.",
        ),
        AqiBand::Unhealthy => (
            AlertSeverity::Critical,
            "Unhealthy Air Quality",
            "Air quality is unhealthy. Everyone should reduce prolonged outdoor exertion.",
        ),
        AqiBand::VeryUnhealthy => (
            AlertSeverity::Critical,
            "Very Unhealthy Air Quality",
            "Air quality is very unhealthy. Avoid outdoor activities.",
        ),
        AqiBand::Hazardous => (
            AlertSeverity::Emergency,
            "HAZARDOUS Air Quality",
            "HAZARDOUS air quality! Stay indoors with windows closed. Use air filtration if available.",
        ),
    };

    let key = format!("threshold_{}", band.key());
    if !cooldowns.allow(&key, now) {
        return None;
    }

    let mut metadata = Map::new();
    metadata.insert("category".to_string(), json!(band.key()));

    Some(Detection {
        kind: AlertKind::Threshold,
        severity,
        title: title.to_string(),
        message: message.to_string(),
        reading_id,
        aqi_value: Some(aqi),
        auto_dismiss: false,
        expires_in: None,
        metadata,
    })
}

/// Anomaly check: z-score of the newest reading against the trailing window
///
/// The baseline is the last N−1 values, deliberately excluding the newest
/// sample, which is the value under test.
pub(crate) fn check_anomaly(
    config: &AlertConfig,
    window: &ReadingWindow,
    cooldowns: &mut CooldownTracker,
    now: Instant,
) -> Option<Detection> {
    if window.len() < config.anomaly_window_size {
        return None;
    }

    let values = window.last_aqi(config.anomaly_window_size);
    if values.len() < 3 {
        return None;
    }

    let baseline = &values[..values.len() - 1];
    let current = values[values.len() - 1] as f64;

    let mean = baseline.iter().sum::<i64>() as f64 / baseline.len() as f64;
    let mut stdev = sample_stdev(baseline, mean);
    if !stdev.is_finite() || stdev <= 0.0 {
        stdev = config.anomaly_fallback_stdev;
    }

    let z_score = (current - mean) / stdev;
    if z_score.abs() <= config.anomaly_std_threshold {
        return None;
    }

    if !cooldowns.allow("anomaly", now) {
        return None;
    }

    let direction = if current > mean { "spike" } else { "drop" };
    let change = (current - mean).abs();

    let mut metadata = Map::new();
    metadata.insert("z_score".to_string(), json!(round2(z_score.abs())));
    metadata.insert("mean".to_string(), json!(round1(mean)));
    metadata.insert("stdev".to_string(), json!(round1(stdev)));
    metadata.insert("direction".to_string(), json!(direction));

    Some(Detection {
        kind: AlertKind::Anomaly,
        severity: AlertSeverity::Warning,
        title: format!(
            "Unusual AQI {}",
            if direction == "spike" { "Spike" } else { "Drop" }
        ),
        message: format!(
            "AQI changed by {:.0} points ({}). Current: {:.0}, Recent average: {:.0}",
            change, direction, current, mean
        ),
        reading_id: None,
        aqi_value: Some(current as i64),
        auto_dismiss: true,
        expires_in: Some(config.anomaly_ttl),
        metadata,
    })
}

/// Trend check: compare the older and newer halves of the trailing window
///
/// One-directional on purpose: only deterioration is flagged, never
/// improvement. A zero older-half mean is treated as a 0% change.
pub(crate) fn check_trend(
    config: &AlertConfig,
    window: &ReadingWindow,
    cooldowns: &mut CooldownTracker,
    now: Instant,
) -> Option<Detection> {
    if window.len() < config.trend_window_size {
        return None;
    }

    let values = window.last_aqi(config.trend_window_size);
    let half = values.len() / 2;
    let older_avg = values[..half].iter().sum::<i64>() as f64 / half as f64;
    let newer_avg = values[half..].iter().sum::<i64>() as f64 / (values.len() - half) as f64;

    let change_pct = if older_avg > 0.0 {
        (newer_avg - older_avg) / older_avg * 100.0
    } else {
        0.0
    };

    if change_pct <= config.trend_change_threshold_pct {
        return None;
    }

    if !cooldowns.allow("trend_worsening", now) {
        return None;
    }

    let mut metadata = Map::new();
    metadata.insert("change_percent".to_string(), json!(round1(change_pct)));
    metadata.insert("from_avg".to_string(), json!(round1(older_avg)));
    metadata.insert("to_avg".to_string(), json!(round1(newer_avg)));

    Some(Detection {
        kind: AlertKind::Trend,
        severity: AlertSeverity::Warning,
        title: "Air Quality Worsening".to_string(),
        message: format!(
            "AQI has increased by {:.0}% over recent readings. Consider taking precautions.",
            change_pct
        ),
        reading_id: None,
        aqi_value: Some(newer_avg as i64),
        auto_dismiss: true,
        expires_in: Some(config.trend_ttl),
        metadata,
    })
}

/// Predictive check: scan a forecast for a near-term threshold breach
///
/// Points within the lead time with AQI above 150 qualify. Cooldown keys
/// bucket the AQI into groups of 50 so a slightly different prediction does
/// not re-alert. At most one alert is emitted per call.
pub(crate) fn check_forecast(
    config: &AlertConfig,
    cooldowns: &mut CooldownTracker,
    now: Instant,
    forecast: &Forecast,
) -> Option<Detection> {
    for point in &forecast.points {
        if point.hours_ahead > config.predictive_lead_time_hours {
            continue;
        }
        if point.aqi <= 150 {
            continue;
        }

        let bucket = (point.aqi / 50) * 50;
        let key = format!("predictive_{}", bucket);
        if !cooldowns.allow(&key, now) {
            continue;
        }

        let severity = if point.aqi > 200 {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        };
        let expires_minutes = ((point.hours_ahead * 60.0) as i64).max(0) as u64;

        let mut metadata = Map::new();
        metadata.insert("hours_ahead".to_string(), json!(point.hours_ahead));
        metadata.insert(
            "forecast_timestamp".to_string(),
            json!(point.timestamp.to_rfc3339()),
        );

        return Some(Detection {
            kind: AlertKind::Predictive,
            severity,
            title: format!("AQI Expected to Reach {}", point.aqi),
            message: format!(
                "Air quality forecast predicts AQI of {} in {:.1} hours. Consider staying indoors.",
                point.aqi, point.hours_ahead
            ),
            reading_id: None,
            aqi_value: Some(point.aqi),
            auto_dismiss: true,
            expires_in: Some(Duration::from_secs(expires_minutes * 60)),
            metadata,
        });
    }

    None
}

/// Sample standard deviation (n−1 denominator)
fn sample_stdev(values: &[i64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ForecastPoint, Reading};
    use chrono::Utc;

    fn window_with(values: &[i64]) -> ReadingWindow {
        let mut window = ReadingWindow::new(50);
        for &aqi in values {
            window.push(Reading::from_aqi(aqi));
        }
        window
    }

    fn tracker() -> CooldownTracker {
        CooldownTracker::new(Duration::from_secs(900))
    }

    fn forecast_point(hours_ahead: f64, aqi: i64) -> ForecastPoint {
        ForecastPoint {
            timestamp: Utc::now(),
            aqi,
            hours_ahead,
        }
    }

    #[test]
    fn test_threshold_good_and_moderate_never_alert() {
        let mut cooldowns = tracker();
        for aqi in [0, 25, 50, 51, 75, 100] {
            assert!(
                check_threshold(&mut cooldowns, Instant::now(), aqi, None).is_none(),
                "aqi {} should not alert",
                aqi
            );
        }
    }

    #[test]
    fn test_threshold_severity_mapping() {
        let now = Instant::now();

        let cases = [
            (120, AlertSeverity::Warning),
            (180, AlertSeverity::Critical),
            (250, AlertSeverity::Critical),
            (400, AlertSeverity::Emergency),
        ];
        for (aqi, severity) in cases {
            let mut cooldowns = tracker();
            let detection = check_threshold(&mut cooldowns, now, aqi, Some(7)).unwrap();
            assert_eq!(detection.severity, severity);
            assert_eq!(detection.kind, AlertKind::Threshold);
            assert_eq!(detection.reading_id, Some(7));
            assert!(!detection.auto_dismiss);
            assert!(detection.expires_in.is_none());
        }
    }

    #[test]
    fn test_threshold_clamps_above_500() {
        let mut cooldowns = tracker();
        let detection = check_threshold(&mut cooldowns, Instant::now(), 900, None).unwrap();
        assert_eq!(detection.severity, AlertSeverity::Emergency);
        assert_eq!(detection.metadata["category"], "hazardous");
    }

    #[test]
    fn test_threshold_cooldown_is_per_band() {
        let mut cooldowns = tracker();
        let now = Instant::now();
        assert!(check_threshold(&mut cooldowns, now, 180, None).is_some());
        // Same band suppressed, different band still fires.
        assert!(check_threshold(&mut cooldowns, now, 190, None).is_none());
        assert!(check_threshold(&mut cooldowns, now, 350, None).is_some());
    }

    #[test]
    fn test_anomaly_spike() {
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        let mut values = vec![50; 9];
        values.push(500);
        let window = window_with(&values);

        let detection =
            check_anomaly(&config, &window, &mut cooldowns, Instant::now()).unwrap();
        assert_eq!(detection.kind, AlertKind::Anomaly);
        assert_eq!(detection.severity, AlertSeverity::Warning);
        assert_eq!(detection.metadata["direction"], "spike");
        assert_eq!(detection.aqi_value, Some(500));
        // Zero baseline spread falls back to 10: z = 450 / 10.
        assert_eq!(detection.metadata["z_score"], 45.0);
    }

    #[test]
    fn test_anomaly_drop_direction() {
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        let mut values = vec![200; 9];
        values.push(10);
        let window = window_with(&values);

        let detection =
            check_anomaly(&config, &window, &mut cooldowns, Instant::now()).unwrap();
        assert_eq!(detection.metadata["direction"], "drop");
    }

    #[test]
    fn test_anomaly_identical_values_do_not_alert() {
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        let window = window_with(&[80; 10]);
        assert!(check_anomaly(&config, &window, &mut cooldowns, Instant::now()).is_none());
    }

    #[test]
    fn test_anomaly_requires_full_window() {
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        let window = window_with(&[50, 50, 50, 500]);
        assert!(check_anomaly(&config, &window, &mut cooldowns, Instant::now()).is_none());
    }

    #[test]
    fn test_anomaly_baseline_excludes_current() {
        // Baseline mean is 50 even though the current value is 500; with a
        // noisy baseline the z-score still clears the threshold.
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        let window = window_with(&[45, 55, 45, 55, 45, 55, 45, 55, 50, 500]);
        let detection =
            check_anomaly(&config, &window, &mut cooldowns, Instant::now()).unwrap();
        assert_eq!(detection.metadata["mean"], 50.0);
    }

    #[test]
    fn test_trend_worsening() {
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        let mut values = vec![50; 10];
        values.extend(vec![70; 10]);
        let window = window_with(&values);

        let detection = check_trend(&config, &window, &mut cooldowns, Instant::now()).unwrap();
        assert_eq!(detection.kind, AlertKind::Trend);
        assert_eq!(detection.metadata["change_percent"], 40.0);
        assert_eq!(detection.metadata["from_avg"], 50.0);
        assert_eq!(detection.metadata["to_avg"], 70.0);
        assert_eq!(detection.aqi_value, Some(70));
    }

    #[test]
    fn test_trend_small_increase_does_not_alert() {
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        let mut values = vec![50; 10];
        values.extend(vec![55; 10]);
        let window = window_with(&values);
        assert!(check_trend(&config, &window, &mut cooldowns, Instant::now()).is_none());
    }

    #[test]
    fn test_trend_ignores_improvement() {
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        let mut values = vec![100; 10];
        values.extend(vec![40; 10]);
        let window = window_with(&values);
        assert!(check_trend(&config, &window, &mut cooldowns, Instant::now()).is_none());
    }

    #[test]
    fn test_trend_zero_baseline_is_zero_change() {
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        let mut values = vec![0; 10];
        values.extend(vec![80; 10]);
        let window = window_with(&values);
        assert!(check_trend(&config, &window, &mut cooldowns, Instant::now()).is_none());
    }

    #[test]
    fn test_forecast_warning_within_lead_time() {
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        let forecast = Forecast {
            points: vec![forecast_point(1.0, 180)],
            model: None,
        };

        let detection =
            check_forecast(&config, &mut cooldowns, Instant::now(), &forecast).unwrap();
        assert_eq!(detection.kind, AlertKind::Predictive);
        assert_eq!(detection.severity, AlertSeverity::Warning);
        assert_eq!(detection.expires_in, Some(Duration::from_secs(3600)));
        assert_eq!(detection.metadata["hours_ahead"], 1.0);
    }

    #[test]
    fn test_forecast_critical_above_200() {
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        let forecast = Forecast {
            points: vec![forecast_point(0.5, 250)],
            model: None,
        };
        let detection =
            check_forecast(&config, &mut cooldowns, Instant::now(), &forecast).unwrap();
        assert_eq!(detection.severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_forecast_beyond_lead_time_ignored() {
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        let forecast = Forecast {
            points: vec![forecast_point(5.0, 180)],
            model: None,
        };
        assert!(check_forecast(&config, &mut cooldowns, Instant::now(), &forecast).is_none());
    }

    #[test]
    fn test_forecast_emits_at_most_one() {
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        let forecast = Forecast {
            points: vec![forecast_point(0.5, 180), forecast_point(1.0, 260)],
            model: None,
        };
        let detection =
            check_forecast(&config, &mut cooldowns, Instant::now(), &forecast).unwrap();
        // First qualifying point wins, even with a worse one later.
        assert_eq!(detection.aqi_value, Some(180));
    }

    #[test]
    fn test_forecast_bucketed_cooldown() {
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        let now = Instant::now();

        let first = Forecast {
            points: vec![forecast_point(1.0, 180)],
            model: None,
        };
        assert!(check_forecast(&config, &mut cooldowns, now, &first).is_some());

        // 190 shares the 150-bucket and is suppressed; 210 is a new bucket.
        let same_bucket = Forecast {
            points: vec![forecast_point(1.0, 190)],
            model: None,
        };
        assert!(check_forecast(&config, &mut cooldowns, now, &same_bucket).is_none());

        let new_bucket = Forecast {
            points: vec![forecast_point(1.0, 210)],
            model: None,
        };
        assert!(check_forecast(&config, &mut cooldowns, now, &new_bucket).is_some());
    }

    #[test]
    fn test_forecast_empty_is_quiet() {
        let config = AlertConfig::default();
        let mut cooldowns = tracker();
        assert!(check_forecast(
            &config,
            &mut cooldowns,
            Instant::now(),
            &Forecast::default()
        )
        .is_none());
    }

    #[test]
    fn test_sample_stdev() {
        let values = [2i64, 4, 4, 4, 5, 5, 7, 9];
        let mean = values.iter().sum::<i64>() as f64 / values.len() as f64;
        let stdev = sample_stdev(&values, mean);
        assert!((stdev - 2.138).abs() < 0.001);
    }
}
