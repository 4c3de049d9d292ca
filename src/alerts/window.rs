//! Sliding window of recent readings

use std::collections::VecDeque;

use crate::data::Reading;

/// Bounded FIFO of the most recent readings, oldest evicted first
#[derive(Debug)]
pub struct ReadingWindow {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl ReadingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a reading, evicting the oldest if the window is full
    pub fn push(&mut self, reading: Reading) {
        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// The up-to-`n` most recent AQI values in chronological order
    ///
    /// May return fewer than `n`; callers treat a short result as "not
    /// enough data" and skip evaluation.
    pub fn last_aqi(&self, n: usize) -> Vec<i64> {
        let skip = self.readings.len().saturating_sub(n);
        self.readings.iter().skip(skip).map(|r| r.aqi).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_with(values: &[i64], capacity: usize) -> ReadingWindow {
        let mut window = ReadingWindow::new(capacity);
        for &aqi in values {
            window.push(Reading::from_aqi(aqi));
        }
        window
    }

    #[test]
    fn test_evicts_oldest_at_capacity() {
        let window = window_with(&[1, 2, 3, 4, 5], 3);
        assert_eq!(window.len(), 3);
        assert_eq!(window.last_aqi(3), vec![3, 4, 5]);
    }

    #[test]
    fn test_last_returns_fewer_when_short() {
        let window = window_with(&[10, 20], 50);
        assert_eq!(window.last_aqi(5), vec![10, 20]);
    }

    #[test]
    fn test_last_is_chronological() {
        let window = window_with(&[1, 2, 3, 4], 50);
        assert_eq!(window.last_aqi(2), vec![3, 4]);
    }
}
