//! BackoffPolicy - 失敗ごとの有効期限の延び方と、ポリシー側の再試行上限

use std::time::Duration;

/// Maps a retry count to an expiry offset.
///
/// Contract: `retry_in` is monotonically non-decreasing in `retries` and
/// bounded. The executor stops at `min(configured max, max_retries())`.
pub trait BackoffPolicy: Send + Sync {
    /// Upper bound on retries imposed by the policy.
    fn max_retries(&self) -> u32;

    /// Offset from the message's `added_at` after `retries` failures.
    fn retry_in(&self, retries: u32) -> Duration;
}

/// Exponential backoff with a ceiling.
///
/// delay = min(base_delay * multiplier^(retries - 1), max_delay)
///
/// Example with base_delay=2s, multiplier=2.0:
/// - retries 1: 2s
/// - retries 2: 4s
/// - retries 3: 8s
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Delay after the first failure.
    pub base_delay: Duration,

    pub multiplier: f64,

    /// Ceiling for any single delay.
    pub max_delay: Duration,

    pub max_retries: u32,
}

impl ExponentialBackoff {
    pub fn new(base_delay: Duration, multiplier: f64, max_delay: Duration, max_retries: u32) -> Self {
        Self {
            base_delay,
            multiplier: multiplier.max(1.0),
            max_delay: max_delay.max(base_delay),
            max_retries,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), 2.0, Duration::from_secs(3600), 3)
    }
}

impl BackoffPolicy for ExponentialBackoff {
    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn retry_in(&self, retries: u32) -> Duration {
        let exponent = retries.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let max = self.max_delay.as_secs_f64();
        if !secs.is_finite() || secs >= max {
            return self.max_delay;
        }
        Duration::from_secs_f64(secs)
    }
}
