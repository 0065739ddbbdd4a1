//! Process-wide admission control for provider calls.
//!
//! One [`RateLimiter`] is shared by every caller that talks to the provider.
//! Two admissions are always at least `interval` apart in
//! [`RateLimitMode::Serialized`], no matter how many tasks ask at once.
//!
//! [`RateLimitMode::Burst`] reproduces the looser behaviour of a timestamp
//! check that is not held across the wait: concurrent callers that observe
//! the same last admission all wait the same amount and proceed together.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::trace;

/// How concurrent callers are admitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitMode {
    /// Strict spacing; callers queue on the limiter.
    #[default]
    Serialized,
    /// Spacing only against the last admission observed before waiting.
    Burst,
}

/// Minimum-interval gate in front of the provider.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    mode: RateLimitMode,
    last_admitted: Mutex<Option<Instant>>,
    admissions: AtomicU64,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self::with_mode(interval, RateLimitMode::default())
    }

    pub fn with_mode(interval: Duration, mode: RateLimitMode) -> Self {
        Self {
            interval,
            mode,
            last_admitted: Mutex::new(None),
            admissions: AtomicU64::new(0),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn mode(&self) -> RateLimitMode {
        self.mode
    }

    /// Total number of admissions granted so far.
    pub fn admissions(&self) -> u64 {
        self.admissions.load(Ordering::Relaxed)
    }

    /// Wait until the caller may issue a provider call.
    pub async fn admit(&self) {
        match self.mode {
            RateLimitMode::Serialized => {
                // Holding the lock across the sleep queues the other callers.
                let mut last = self.last_admitted.lock().await;
                if let Some(wait) = self.remaining(*last) {
                    trace!(?wait, "Rate limited");
                    sleep(wait).await;
                }
                *last = Some(Instant::now());
            }
            RateLimitMode::Burst => {
                let observed = *self.last_admitted.lock().await;
                if let Some(wait) = self.remaining(observed) {
                    trace!(?wait, "Rate limited");
                    sleep(wait).await;
                }
                *self.last_admitted.lock().await = Some(Instant::now());
            }
        }
        self.admissions.fetch_add(1, Ordering::Relaxed);
    }

    fn remaining(&self, last: Option<Instant>) -> Option<Duration> {
        let elapsed = last?.elapsed();
        (elapsed < self.interval).then(|| self.interval - elapsed)
    }
}
