//! Retry with exponential backoff
//!
//! Only retryable errors (see [`FetchError::is_retryable`]) are repeated.
//! Attempts are strictly sequential and stop as soon as the caller's
//! [`CancellationToken`] fires, including mid-backoff.

use crate::{
    constants::{BASE_DELAY_MS, MAX_RETRIES},
    error::FetchError,
};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Backoff schedule for one logical request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Total attempts including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry `n` (1-based): `base_delay * 2^(n-1)`
    pub fn delay_for_retry(&self, n: u32) -> Duration {
        let exponent = n.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

/// Retry bookkeeping that lives for one logical request
#[derive(Debug, Default)]
struct RetryState {
    retries: u32,
}

impl RetryState {
    fn attempt_number(&self) -> u32 {
        self.retries + 1
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error,
/// exhausts `policy`, or `cancel` fires.
///
/// `operation` receives the 1-based attempt number. After the final attempt
/// the last error is returned unchanged.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut state = RetryState::default();

    loop {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let attempt = state.attempt_number();
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(FetchError::Cancelled),
            result = operation(attempt) => result,
        };

        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) => err,
        };

        if state.retries >= policy.max_retries {
            tracing::warn!(
                attempt = attempt,
                max_attempts = policy.max_attempts(),
                error = %err,
                "Request failed, retries exhausted"
            );
            return Err(err);
        }

        state.retries += 1;
        let delay = policy.delay_for_retry(state.retries);

        tracing::warn!(
            attempt = attempt,
            max_attempts = policy.max_attempts(),
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Request failed, retrying"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FetchError::Cancelled),
            () = sleep(delay) => {}
        }
    }
}
