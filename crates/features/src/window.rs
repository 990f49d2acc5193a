//! Count-based trailing window.
//!
//! Keeps the most recent `window` observations. With fewer observations the
//! mean is taken over what is there; nothing is padded.

use std::collections::VecDeque;

use statrs::statistics::Statistics;

/// Trailing mean over the last `window` observations.
#[derive(Debug, Clone)]
pub struct TrailingMean {
    /// Window size in records.
    window: usize,
    /// Observations currently in the window.
    values: VecDeque<f64>,
}

impl TrailingMean {
    /// Create a trailing mean. A zero window is treated as one.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            values: VecDeque::with_capacity(window),
        }
    }

    /// Add an observation, evicting the oldest when the window is full.
    pub fn push(&mut self, value: f64) {
        if self.values.len() >= self.window {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Mean of the window, if it holds anything.
    ///
    /// Recomputed from the held values on each call.
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.values.iter().mean())
        }
    }

    /// Most recent observation.
    pub fn last(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Get the number of observations.
    pub fn count(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty() {
        let window = TrailingMean::new(12);
        assert!(window.mean().is_none());
        assert!(window.last().is_none());
        assert_eq!(window.count(), 0);
    }

    #[test]
    fn test_short_history_is_not_padded() {
        let mut window = TrailingMean::new(12);
        for v in [10.0, 20.0, 30.0] {
            window.push(v);
        }
        assert_eq!(window.count(), 3);
        assert_relative_eq!(window.mean().unwrap(), 20.0);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut window = TrailingMean::new(12);
        for v in 1..=15 {
            window.push(v as f64);
        }
        assert_eq!(window.count(), 12);
        // Mean of 4..=15.
        assert_relative_eq!(window.mean().unwrap(), 9.5, epsilon = 1e-12);
        assert_eq!(window.last(), Some(15.0));
    }

    #[test]
    fn test_zero_window_holds_one() {
        let mut window = TrailingMean::new(0);
        window.push(1.0);
        window.push(2.0);
        assert_eq!(window.count(), 1);
        assert_eq!(window.mean(), Some(2.0));
    }

    #[test]
    fn test_mixed_magnitudes_leave_no_residue() {
        let mut window = TrailingMean::new(2);
        for v in [1e16, 1.0, 1.0] {
            window.push(v);
        }
        assert_eq!(window.mean(), Some(1.0));
    }
}
