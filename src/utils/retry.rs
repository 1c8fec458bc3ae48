//! Retry pacing
//!
//! The rotation decision for a failed request lives in the fetcher together
//! with the key pool; this module only provides the delay policy applied
//! between attempts, using exponential backoff with jitter to avoid hammering
//! an upstream that is already rejecting us.

use rand::Rng;
use std::time::Duration;

/// Delay policy between retry attempts
#[derive(Debug, Clone)]
pub struct Backoff {
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Cap on the exponential growth
    pub max_delay: Duration,
    /// Growth factor per attempt (typically 2.0)
    pub multiplier: f64,
    /// Add random jitter up to the computed delay
    pub use_jitter: bool,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            use_jitter: true,
        }
    }
}

impl Backoff {
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, use_jitter: bool) -> Self {
        self.use_jitter = use_jitter;
        self
    }

    /// Delay for a given retry attempt (0-indexed)
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let delay_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        let delay_ms = if self.use_jitter {
            delay_ms + rand::thread_rng().gen_range(0.0..delay_ms.max(1.0))
        } else {
            delay_ms
        };

        Duration::from_millis(delay_ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_exponentially_without_jitter() {
        let backoff = Backoff::default().with_jitter(false);
        assert_eq!(backoff.delay(0), Duration::from_millis(200));
        assert_eq!(backoff.delay(1), Duration::from_millis(400));
        assert_eq!(backoff.delay(2), Duration::from_millis(800));
    }

    #[test]
    fn test_delay_respects_max() {
        let backoff = Backoff::default()
            .with_max_delay(Duration::from_millis(500))
            .with_jitter(false);
        assert_eq!(backoff.delay(5), Duration::from_millis(500));
        assert_eq!(backoff.delay(20), Duration::from_millis(500));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let backoff = Backoff::default();
        let delay = backoff.delay(0);
        assert!(delay >= Duration::from_millis(200));
        assert!(delay <= Duration::from_millis(400));
    }
}
