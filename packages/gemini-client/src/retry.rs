//! Retry policy for transient API failures.
//!
//! One explicit policy object owns all retry behavior; there is no second
//! retry layer hidden inside the transport, so attempts never compound.

use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 4;
const DEFAULT_BASE_DELAY_MS: u64 = 400;
const DEFAULT_MAX_JITTER_MS: u64 = 200;

/// Retry policy: bounded attempts, exponential backoff, jitter, and a
/// retryable-status predicate.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_jitter: Duration::from_millis(DEFAULT_MAX_JITTER_MS),
        }
    }
}

impl RetryPolicy {
    /// Whether an HTTP status is transient (rate-limited or overloaded).
    pub fn is_retryable(&self, status: u16) -> bool {
        status == 429 || status == 503
    }

    /// Backoff delay before the next attempt: `base * 2^attempt` plus jitter.
    /// `attempt` is zero-based.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms > 0 {
            Duration::from_millis(fastrand::u64(0..jitter_ms))
        } else {
            Duration::ZERO
        };
        exp + jitter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        let policy = RetryPolicy::default();
        assert!(policy.is_retryable(429));
        assert!(policy.is_retryable(503));
        assert!(!policy.is_retryable(400));
        assert!(!policy.is_retryable(401));
        assert!(!policy.is_retryable(500));
    }

    #[test]
    fn delay_grows_exponentially() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_jitter: Duration::ZERO,
        };
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(2), Duration::from_millis(400));
        assert_eq!(policy.delay(3), Duration::from_millis(800));
    }

    #[test]
    fn jitter_stays_bounded() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_jitter: Duration::from_millis(50),
        };
        for _ in 0..100 {
            let d = policy.delay(0);
            assert!(d >= Duration::from_millis(100));
            assert!(d < Duration::from_millis(150));
        }
    }
}
