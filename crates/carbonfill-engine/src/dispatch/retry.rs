//! Connection retry policy.

use std::time::Duration;

use crate::config::types::DispatchConfig;

const BACKOFF_MAX_MS: u64 = 60_000;

/// Delay schedule for retries of a single request.
pub trait BackoffPolicy {
    /// Delay before retry `retry` (1-based).
    fn delay_for_retry(&self, retry: u32) -> Duration;
}

/// Exponential backoff for connection-level failures.
///
/// Only failures where no HTTP response was received are retried; a status
/// code from the service is always final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 500,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
        }
    }

    /// Whether another retry is allowed after `performed` retries.
    #[must_use]
    pub fn allows_retry(&self, performed: u32) -> bool {
        performed < self.max_retries
    }
}

impl BackoffPolicy for RetryPolicy {
    fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = 2u64.saturating_pow(retry.saturating_sub(1));
        let delay_ms = self.backoff_base_ms.saturating_mul(factor);
        Duration::from_millis(delay_ms.min(BACKOFF_MAX_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for_retry(3), Duration::from_millis(2_000));
    }

    #[test]
    fn test_backoff_capped() {
        let policy = RetryPolicy {
            max_retries: 100,
            backoff_base_ms: 1_000,
        };
        assert_eq!(policy.delay_for_retry(10), Duration::from_millis(60_000));
        assert_eq!(policy.delay_for_retry(80), Duration::from_millis(60_000));
    }

    #[test]
    fn test_retry_zero_treated_as_first() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_retry(0), Duration::from_millis(500));
    }

    #[test]
    fn test_allows_retry_up_to_max() {
        let policy = RetryPolicy::default();
        assert!(policy.allows_retry(0));
        assert!(policy.allows_retry(2));
        assert!(!policy.allows_retry(3));

        let never = RetryPolicy {
            max_retries: 0,
            backoff_base_ms: 10,
        };
        assert!(!never.allows_retry(0));
    }
}
