//! Clock abstraction for cooldown and expiry timing
//!
//! All rate-limiting and expiry comparisons in the alert engine use a
//! monotonic clock so they are immune to wall-clock adjustments. Wall time
//! is only ever read for display and serialization.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Source of monotonic and wall-clock time
pub trait Clock: Send + Sync + 'static {
    /// Monotonic instant, used for all elapsed-time comparisons
    fn now(&self) -> Instant;

    /// Wall-clock time, used only for timestamps shown to humans
    fn wall_now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanceable clock for deterministic tests
///
/// Time only moves when `advance` is called, so cooldown windows and alert
/// TTLs can be crossed without sleeping.
pub struct ManualClock {
    base: Instant,
    wall_base: DateTime<Utc>,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            wall_base: Utc::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward by `delta`
    pub fn advance(&self, delta: Duration) {
        let mut offset = self.offset.lock();
        *offset += delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        self.wall_base
            + chrono::Duration::from_std(*self.offset.lock()).unwrap_or(chrono::Duration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        let w0 = clock.wall_now();

        clock.advance(Duration::from_secs(90));

        assert_eq!(clock.now().duration_since(t0), Duration::from_secs(90));
        assert_eq!((clock.wall_now() - w0).num_seconds(), 90);
    }

    #[test]
    fn test_manual_clock_is_frozen_without_advance() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);
    }
}
