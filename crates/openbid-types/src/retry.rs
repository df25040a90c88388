//! Bounded retry with exponential backoff for transient storage faults.
//!
//! The commit path runs inside an auction's exclusive section, so retries
//! must stay short and bounded: the policy caps both the attempt count
//! and the per-attempt delay. Only errors classified retryable by
//! [`BidError::is_retryable`] are retried; everything else returns on the
//! first failure.
//!
//! [`BidError::is_retryable`]: crate::BidError::is_retryable

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Result, constants};

/// Retry schedule: `base * 2^(attempt-1)` milliseconds, capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. At least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    pub base_delay_ms: u64,
    /// Ceiling for any single delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: constants::DEFAULT_COMMIT_ATTEMPTS,
            base_delay_ms: constants::DEFAULT_RETRY_BASE_MS,
            max_delay_ms: constants::DEFAULT_RETRY_MAX_MS,
        }
    }
}

impl RetryPolicy {
    /// # Panics
    /// Panics if `max_attempts` is zero.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        assert!(max_attempts >= 1, "RetryPolicy requires at least 1 attempt");
        Self {
            max_attempts,
            base_delay_ms,
            max_delay_ms,
        }
    }

    /// A policy that retries immediately, for tests.
    #[must_use]
    pub fn no_delay(max_attempts: u32) -> Self {
        Self::new(max_attempts, 0, 0)
    }

    /// The delay after the given 1-based attempt failed.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        // Shift clamp keeps 2^exp inside u64 for absurd attempt counts.
        let exp = attempt.saturating_sub(1).min(16);
        let ms = self
            .base_delay_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }

    /// Run `op` under this policy.
    ///
    /// Returns the first success, the first non-retryable error, or the
    /// last error once attempts are exhausted.
    pub fn run<T>(&self, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_after(attempt);
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}
