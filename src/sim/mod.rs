//! Demo sensor simulator
//!
//! Generates BME680-style readings with realistic daily cycles and random
//! pollution events, so the full ingest/alert path can be exercised
//! without hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time;

use crate::data::Reading;

const BASE_TEMP: f64 = 22.0;
const BASE_HUMIDITY: f64 = 45.0;
const BASE_PRESSURE: f64 = 1013.0;
const BASE_GAS: f64 = 150_000.0; // good air quality

/// Generates simulated sensor readings
pub struct ReadingGenerator {
    rng: StdRng,
    started: Instant,
    pollution_until: Option<Instant>,
    reading_count: u64,
}

impl ReadingGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            started: Instant::now(),
            pollution_until: None,
            reading_count: 0,
        }
    }

    #[cfg(test)]
    fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            started: Instant::now(),
            pollution_until: None,
            reading_count: 0,
        }
    }

    /// Produce the next simulated reading
    pub fn next_reading(&mut self) -> Reading {
        self.reading_count += 1;
        let now = Instant::now();
        let t = now.duration_since(self.started).as_secs_f64();

        // Daily and per-minute cycles for realistic drift
        let hour_factor = (t / 3600.0 * std::f64::consts::PI / 12.0).sin();
        let minute_factor = (t / 60.0 * std::f64::consts::PI).sin();

        // Random pollution events, 3% onset chance, 30-90s duration
        match self.pollution_until {
            Some(until) if now >= until => {
                self.pollution_until = None;
                tracing::info!("Simulated pollution event ended");
            }
            None if self.rng.gen_bool(0.03) => {
                let duration = Duration::from_secs_f64(self.rng.gen_range(30.0..90.0));
                self.pollution_until = Some(now + duration);
                tracing::info!(duration_secs = duration.as_secs(), "Simulating pollution event");
            }
            _ => {}
        }

        let temperature = BASE_TEMP
            + 5.0 * hour_factor
            + self.rng.gen_range(-0.3..0.3)
            + 0.2 * minute_factor;

        let humidity =
            (BASE_HUMIDITY - 15.0 * hour_factor + self.rng.gen_range(-1.0..1.0)).clamp(25.0, 75.0);

        let pressure = BASE_PRESSURE + 8.0 * (t / 10_000.0).sin() + self.rng.gen_range(-0.3..0.3);

        // Gas resistance: higher means cleaner air
        let gas_resistance = if self.pollution_until.is_some() {
            self.rng.gen_range(25_000.0..60_000.0)
        } else {
            (BASE_GAS + 40_000.0 * hour_factor + self.rng.gen_range(-8_000.0..8_000.0))
                .max(15_000.0)
        };

        let aqi = self.calculate_aqi(gas_resistance, humidity);

        Reading {
            id: None,
            node_id: Some("demo_simulator".to_string()),
            temperature: round2(temperature),
            humidity: round2(humidity),
            pressure: Some(round2(pressure)),
            gas_resistance: gas_resistance.round(),
            aqi,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Derive AQI from gas resistance, calibrated for indoor ranges
    /// (typical indoor: 30k-150k ohms)
    fn calculate_aqi(&mut self, gas_resistance: f64, humidity: f64) -> i64 {
        // Gas sensors drift with humidity; compensate before banding
        let humidity_factor = 1.0 + (humidity - 50.0) * 0.002;
        let compensated = gas_resistance * humidity_factor;

        let aqi = if compensated > 150_000.0 {
            self.rng.gen_range(0..=25) // very clean air
        } else if compensated > 100_000.0 {
            self.rng.gen_range(25..=50) // well ventilated
        } else if compensated > 70_000.0 {
            self.rng.gen_range(50..=75) // normal indoor
        } else if compensated > 50_000.0 {
            self.rng.gen_range(75..=100) // typical room
        } else if compensated > 35_000.0 {
            self.rng.gen_range(100..=150) // stuffy
        } else if compensated > 20_000.0 {
            self.rng.gen_range(150..=200) // poor ventilation
        } else {
            self.rng.gen_range(200..=300)
        };

        aqi.clamp(0, 500)
    }
}

impl Default for ReadingGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Background worker that feeds simulated readings into the ingest path
pub struct Simulator {
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl Simulator {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start generating readings, invoking `ingest` for each
    pub fn start<F>(self: Arc<Self>, mut ingest: F) -> tokio::task::JoinHandle<()>
    where
        F: FnMut(Reading) + Send + 'static,
    {
        self.running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            tracing::info!("Demo simulator started with interval {:?}", self.interval);

            let mut generator = ReadingGenerator::new();
            let mut ticker = time::interval(self.interval);

            while self.running.load(Ordering::SeqCst) {
                ticker.tick().await;
                ingest(generator.next_reading());
            }

            tracing::info!("Demo simulator stopped");
        })
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AqiBand;

    #[test]
    fn test_readings_stay_in_range() {
        let mut generator = ReadingGenerator::with_seed(7);
        for _ in 0..500 {
            let reading = generator.next_reading();
            assert!((0..=500).contains(&reading.aqi), "aqi {}", reading.aqi);
            assert!((25.0..=75.0).contains(&reading.humidity));
            assert!(reading.gas_resistance >= 15_000.0);
            // Any generated AQI must map to a real band
            let _ = AqiBand::from_aqi(reading.aqi);
        }
    }

    #[test]
    fn test_readings_carry_demo_node_id() {
        let mut generator = ReadingGenerator::with_seed(7);
        let reading = generator.next_reading();
        assert_eq!(reading.node_id.as_deref(), Some("demo_simulator"));
        assert!(reading.id.is_none());
    }

    #[test]
    fn test_clean_air_maps_to_low_aqi() {
        let mut generator = ReadingGenerator::with_seed(7);
        let aqi = generator.calculate_aqi(200_000.0, 50.0);
        assert!(aqi <= 25);
    }

    #[test]
    fn test_polluted_air_maps_to_high_aqi() {
        let mut generator = ReadingGenerator::with_seed(7);
        let aqi = generator.calculate_aqi(18_000.0, 50.0);
        assert!(aqi >= 200);
    }
}
