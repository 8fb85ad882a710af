//! Exponential backoff with jitter for upstream retries.

use std::time::Duration;

/// Exponential backoff calculator with jitter.
pub struct Backoff {
    base_ms: u64,
    factor: f64,
    jitter_ms: u64,
    attempt: u32,
}

impl Backoff {
    /// Create a new backoff starting at `base_ms`, growing by `factor` per
    /// attempt, with up to `jitter_ms` of random spread added to each delay.
    pub fn new(base_ms: u64, factor: f64, jitter_ms: u64) -> Self {
        Self {
            base_ms,
            factor,
            jitter_ms,
            attempt: 0,
        }
    }

    /// Get the next delay duration and increment the attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        let exp = (self.base_ms as f64 * self.factor.powi(self.attempt as i32)).round() as u64;
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::random::<u64>() % (self.jitter_ms + 1)
        };
        self.attempt = self.attempt.saturating_add(1);
        Duration::from_millis(exp.saturating_add(jitter))
    }

    /// Reset the backoff (e.g. after a successful request).
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
