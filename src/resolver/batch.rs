//! Bulk resolution in bounded batches.
//!
//! Ids that already have a durable mapping are dropped up front; they cost
//! neither an admission nor a provider call. The rest are split into
//! fixed-size batches processed one after another:
//!
//! ```text
//! batch 1 ──► flush ──► pause ──► batch 2 ──► flush ──► pause ──► ... ──► batch N ──► flush
//! ```
//!
//! Inside a batch ids are resolved either one by one with a short pause
//! between them ([`BatchDispatch::Sequential`]) or all at once
//! ([`BatchDispatch::Concurrent`]). The flush after every batch is a
//! checkpoint: an interrupted run keeps everything fetched by completed
//! batches.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{Resolution, ResolutionSource, Resolver};
use crate::constants::{DEFAULT_BATCH_DELAY_MS, DEFAULT_BATCH_SIZE, DEFAULT_ITEM_DELAY_MS};
use crate::core::PunkId;
use crate::utils::ProgressBar;

/// How the members of one batch are dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchDispatch {
    #[default]
    Sequential,
    Concurrent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub batch_size: usize,
    pub batch_delay: Duration,
    /// Pause between two ids of a sequential batch.
    pub item_delay: Duration,
    pub dispatch: BatchDispatch,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
            item_delay: Duration::from_millis(DEFAULT_ITEM_DELAY_MS),
            dispatch: BatchDispatch::default(),
        }
    }
}

/// Counts for one bulk run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Ids handed to the runner.
    pub total: usize,
    /// Ids that already had a mapping.
    pub skipped: usize,
    pub fetched: usize,
    pub fallback: usize,
    pub batches: usize,
    /// Batches whose checkpoint flush failed.
    pub checkpoint_failures: usize,
}

impl BatchReport {
    fn record(&mut self, resolution: &Resolution) {
        match resolution.source {
            ResolutionSource::Cached => self.skipped += 1,
            ResolutionSource::Fetched => self.fetched += 1,
            ResolutionSource::Fallback => self.fallback += 1,
        }
    }
}

pub struct BatchRunner {
    resolver: Arc<Resolver>,
    options: BatchOptions,
    progress: Option<ProgressBar>,
}

impl BatchRunner {
    pub fn new(resolver: Arc<Resolver>, options: BatchOptions) -> Self {
        Self {
            resolver,
            options,
            progress: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Resolve every id in `ids`, batch by batch.
    pub async fn run_all(&self, ids: impl IntoIterator<Item = PunkId>) -> BatchReport {
        let mut report = BatchReport::default();
        let mut pending = Vec::new();
        for id in ids {
            report.total += 1;
            if self.resolver.store().contains(id).await {
                report.skipped += 1;
            } else {
                pending.push(id);
            }
        }

        info!(total = report.total, skipped = report.skipped, pending = pending.len(), "Starting bulk resolution");
        if let Some(progress) = &self.progress {
            progress.inc(report.skipped as u64);
        }
        if pending.is_empty() {
            return report;
        }

        let batch_size = self.options.batch_size.max(1);
        let batch_count = pending.len().div_ceil(batch_size);

        for (index, batch) in pending.chunks(batch_size).enumerate() {
            let number = index + 1;
            debug!(batch = number, of = batch_count, size = batch.len(), "Processing batch");

            let resolutions = self.run_batch(batch).await;
            let succeeded = resolutions
                .iter()
                .filter(|r| r.source != ResolutionSource::Fallback)
                .count();
            for resolution in &resolutions {
                report.record(resolution);
            }
            report.batches += 1;

            if let Err(e) = self.resolver.store().flush().await {
                report.checkpoint_failures += 1;
                warn!(batch = number, error = %e, "Checkpoint failed");
            }

            info!(
                "Batch {}/{} completed: {}/{} successful",
                number,
                batch_count,
                succeeded,
                batch.len()
            );

            if number < batch_count {
                sleep(self.options.batch_delay).await;
            }
        }

        report
    }

    async fn run_batch(&self, batch: &[PunkId]) -> Vec<Resolution> {
        match self.options.dispatch {
            BatchDispatch::Sequential => {
                let mut resolutions = Vec::with_capacity(batch.len());
                for (position, id) in batch.iter().enumerate() {
                    if position > 0 {
                        sleep(self.options.item_delay).await;
                    }
                    resolutions.push(self.resolve_one(*id).await);
                }
                resolutions
            }
            BatchDispatch::Concurrent => {
                join_all(batch.iter().map(|id| self.resolve_one(*id))).await
            }
        }
    }

    async fn resolve_one(&self, id: PunkId) -> Resolution {
        let resolution = self.resolver.resolve_detailed(id).await;
        if let Some(progress) = &self.progress {
            progress.inc(1);
        }
        resolution
    }
}
