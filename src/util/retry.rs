//! Retry policy with exponential backoff and full jitter.
//!
//! Used by the outbound HTTP clients. Delays grow exponentially from a base,
//! are capped, and the actual sleep is drawn uniformly from `0..=capped` so
//! that concurrent workers do not retry in lockstep.

use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 250,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
            max_delay_ms,
        }
    }

    /// Delay before the given attempt. Attempt 0 is the first try and never
    /// waits; attempt `n` waits up to `base * 2^(n-1)` capped at
    /// `max_delay_ms`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exp = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt - 1));
        let capped = exp.min(self.max_delay_ms);
        let jittered = rand::rng().random_range(0..=capped);
        Duration::from_millis(jittered)
    }

    /// `max_attempts` counts total tries, so attempt numbers below it may
    /// still go around the loop.
    #[must_use]
    pub const fn can_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Transport failures and throttling responses are worth another attempt;
/// everything else surfaces immediately.
#[must_use]
pub fn is_retryable_error(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    match err.status() {
        Some(status) => status.is_server_error() || status.as_u16() == 429,
        None => err.is_request(),
    }
}
