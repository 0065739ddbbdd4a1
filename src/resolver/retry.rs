//! Bounded retries with exponential backoff and per-attempt deadlines.
//!
//! # Retry Strategy
//!
//! - Attempts: 3 by default
//! - Backoff after attempt `n`: `min(1000ms * 2^(n-1), 5000ms)`, so 1s then 2s
//! - Each attempt runs under its own deadline (10s by default); an attempt
//!   that exceeds it is cancelled and counts as failed
//!
//! Every [`FetchError`] is retryable, including a 2xx response without an
//! image URL.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

use crate::constants::{
    DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_MAX_ATTEMPTS, RETRY_BASE_DELAY_MS, RETRY_MAX_DELAY_MS,
};
use crate::provider::FetchError;

/// All attempts failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("gave up after {attempts} attempt(s): {last_error}")]
pub struct RetriesExhausted {
    pub attempts: u32,
    pub last_error: FetchError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_ATTEMPT_TIMEOUT)
    }
}

impl RetryPolicy {
    /// `max_attempts` below 1 is raised to 1.
    pub fn new(max_attempts: u32, attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            attempt_timeout,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Waits between consecutive attempts, one fewer than `max_attempts`.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        // from_millis(2).factor(500) yields 1000, 2000, 4000...
        ExponentialBackoff::from_millis(2)
            .factor(RETRY_BASE_DELAY_MS / 2)
            .max_delay(Duration::from_millis(RETRY_MAX_DELAY_MS))
            .take(self.max_attempts as usize - 1)
    }

    /// Run `attempt` until it succeeds or the attempts are used up.
    ///
    /// # Errors
    ///
    /// Returns [`RetriesExhausted`] carrying the last attempt's error.
    pub async fn execute<T, F, Fut>(&self, mut attempt: F) -> Result<T, RetriesExhausted>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let schedule: Vec<Duration> = self.delays().collect();
        let attempts = AtomicU32::new(0);
        let timeout = self.attempt_timeout;
        let max_attempts = self.max_attempts;

        let result = Retry::spawn(schedule.clone(), || {
            let number = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            let next_delay = schedule.get(number as usize - 1).copied();
            let fut = attempt();
            async move {
                let outcome = match tokio::time::timeout(timeout, fut).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(FetchError::Timeout(timeout)),
                };
                if let Err(ref err) = outcome {
                    match next_delay {
                        Some(delay) => warn!(
                            %err,
                            attempt = number,
                            max_attempts,
                            ?delay,
                            "Attempt failed, retrying"
                        ),
                        None => debug!(%err, attempt = number, "Final attempt failed"),
                    }
                }
                outcome
            }
        })
        .await;

        result.map_err(|last_error| RetriesExhausted {
            attempts: attempts.load(Ordering::Relaxed),
            last_error,
        })
    }
}
