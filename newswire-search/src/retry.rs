//! Retry policy for provider requests.

use std::time::Duration;

/// Largest `max_retries` accepted by [`crate::SearchConfig::validate`].
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Bounded exponential backoff.
///
/// The delay before retry `n` (1-based) is `initial_backoff_ms * 2^(n-1)`,
/// capped at `max_backoff_ms`. No jitter is applied, so delays are
/// deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `0` means a single attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff_ms: u64,
    /// Upper bound on any single delay.
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 300,
            max_backoff_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Set the retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the initial backoff.
    pub fn with_initial_backoff_ms(mut self, ms: u64) -> Self {
        self.initial_backoff_ms = ms;
        self
    }

    /// Set the backoff cap.
    pub fn with_max_backoff_ms(mut self, ms: u64) -> Self {
        self.max_backoff_ms = ms;
        self
    }

    /// Total attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(32);
        let ms = self
            .initial_backoff_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }

    /// Sum of all delays if every retry is used. Saturates at `Duration::MAX`.
    pub fn total_backoff(&self) -> Duration {
        let mut total = Duration::ZERO;
        for retry in 1..=self.max_retries {
            let delay = self.delay_for_retry(retry);
            // Delays stop changing once capped; the rest is one multiplication.
            if delay == self.delay_for_retry(retry.saturating_add(1)) {
                let remaining = self.max_retries - retry + 1;
                return total.saturating_add(delay.saturating_mul(remaining));
            }
            total = total.saturating_add(delay);
        }
        total
    }
}
