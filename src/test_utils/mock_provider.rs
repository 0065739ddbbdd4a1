//! Scripted metadata provider.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::PunkId;
use crate::provider::{FetchError, MetadataProvider};

/// What the mock answers for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOutcome {
    Found(String),
    Miss,
    Status(u16),
    Transport(String),
    /// Never answers within any realistic attempt timeout.
    Hang,
}

impl MockOutcome {
    async fn play(self) -> Result<Option<String>, FetchError> {
        match self {
            Self::Found(url) => Ok(Some(url)),
            Self::Miss => Ok(None),
            Self::Status(code) => Err(FetchError::Status(code)),
            Self::Transport(message) => Err(FetchError::Transport(message)),
            Self::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }
}

/// Provider whose answers are scripted per id.
///
/// A script is consumed one outcome per call; its last outcome repeats once
/// the script runs out. Ids without a script get the default outcome
/// (`Status(404)` unless changed).
#[derive(Debug)]
pub struct MockProvider {
    scripts: Mutex<HashMap<PunkId, VecDeque<MockOutcome>>>,
    default: MockOutcome,
    calls: Mutex<Vec<PunkId>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            default: MockOutcome::Status(404),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always answer `url` for `id`.
    pub fn with_url(self, id: PunkId, url: impl Into<String>) -> Self {
        self.with_outcome(id, MockOutcome::Found(url.into()))
    }

    /// Always answer `outcome` for `id`.
    pub fn with_outcome(self, id: PunkId, outcome: MockOutcome) -> Self {
        self.with_script(id, vec![outcome])
    }

    /// Answer `outcomes` in order for `id`, repeating the last one.
    pub fn with_script(self, id: PunkId, outcomes: Vec<MockOutcome>) -> Self {
        lock(&self.scripts).insert(id, outcomes.into());
        self
    }

    /// Answer for ids without a script.
    pub fn with_default(mut self, outcome: MockOutcome) -> Self {
        self.default = outcome;
        self
    }

    /// Total number of calls.
    pub fn calls(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Number of calls for `id`.
    pub fn calls_for(&self, id: PunkId) -> usize {
        lock(&self.calls).iter().filter(|called| **called == id).count()
    }

    /// Ids in call order.
    pub fn call_log(&self) -> Vec<PunkId> {
        lock(&self.calls).clone()
    }

    fn next_outcome(&self, id: PunkId) -> MockOutcome {
        let mut scripts = lock(&self.scripts);
        match scripts.get_mut(&id) {
            Some(script) if script.len() > 1 => {
                script.pop_front().unwrap_or_else(|| self.default.clone())
            }
            Some(script) => script.front().cloned().unwrap_or_else(|| self.default.clone()),
            None => self.default.clone(),
        }
    }
}

#[async_trait]
impl MetadataProvider for MockProvider {
    async fn fetch_image_url(&self, id: PunkId) -> Result<Option<String>, FetchError> {
        lock(&self.calls).push(id);
        let outcome = self.next_outcome(id);
        outcome.play().await
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
