//! Per-key alert rate limiting

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tracks the last time each alert key was allowed to fire
///
/// Keys are semantic ("threshold_unhealthy", "anomaly", "predictive_200",
/// ...), so independent condition types never block each other. This is the
/// sole rate-limiting mechanism in the engine.
#[derive(Debug)]
pub struct CooldownTracker {
    last_allowed: HashMap<String, Instant>,
    cooldown: Duration,
}

impl CooldownTracker {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            last_allowed: HashMap::new(),
            cooldown,
        }
    }

    /// Returns true and records `now` if `key` is off cooldown
    ///
    /// A denied call does not mutate state, so a burst of suppressed
    /// conditions does not push the next allowed alert further out.
    pub fn allow(&mut self, key: &str, now: Instant) -> bool {
        if let Some(last) = self.last_allowed.get(key) {
            if now.duration_since(*last) < self.cooldown {
                return false;
            }
        }
        self.last_allowed.insert(key.to_string(), now);
        true
    }

    #[cfg(test)]
    pub fn tracked_keys(&self) -> usize {
        self.last_allowed.len()
    }
}
