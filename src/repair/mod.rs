//! Mapping repair: rewrite Alchemy SVG URLs to Cloudinary PNG URLs.
//!
//! Some clients cannot render the SVGs served by the Alchemy CDN. Alchemy
//! also publishes a PNG rendition of every cached image through Cloudinary,
//! addressed by the same hash (the last path segment of the SVG URL). The
//! [`PngConverter`] sends a `HEAD` request for each PNG candidate and only
//! rewrites the entry when the candidate is reachable.
//!
//! This runs outside the resolver and rewrites the mapping file directly, so
//! it should not run while another process holds the mapping store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::constants::{CLOUDINARY_PNG_PREFIX, DEFAULT_BATCH_SIZE, DEFAULT_ITEM_DELAY_MS};
use crate::core::{ImageKind, PunkId};
use crate::utils::ProgressBar;
use crate::utils::fs::{read_json_file, write_json_file};

/// Checks whether a URL is currently served.
#[async_trait]
pub trait ReachabilityCheck: Send + Sync {
    async fn is_reachable(&self, url: &str) -> bool;
}

/// `HEAD` request over HTTP; any 2xx counts as reachable.
#[derive(Debug, Clone)]
pub struct HttpHeadCheck {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpHeadCheck {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().build().context("Failed to build HTTP client")?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl ReachabilityCheck for HttpHeadCheck {
    async fn is_reachable(&self, url: &str) -> bool {
        match self.client.head(url).timeout(self.timeout).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(url, error = %e, "Reachability check failed");
                false
            }
        }
    }
}

/// PNG candidate for an SVG URL: the configured prefix plus the URL's last
/// path segment. `None` when the URL ends with `/`.
pub fn png_url_for(svg_url: &str, prefix: &str) -> Option<String> {
    let hash = svg_url.rsplit('/').next().filter(|segment| !segment.is_empty())?;
    Some(format!("{prefix}{hash}"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub total: usize,
    pub converted: usize,
    /// SVG entries whose PNG candidate was not reachable.
    pub kept: usize,
    /// Entries that were not SVG URLs.
    pub skipped: usize,
}

pub struct PngConverter {
    checker: Arc<dyn ReachabilityCheck>,
    png_prefix: String,
    batch_size: usize,
    item_delay: Duration,
    progress: Option<ProgressBar>,
}

impl PngConverter {
    pub fn new(checker: Arc<dyn ReachabilityCheck>) -> Self {
        Self {
            checker,
            png_prefix: CLOUDINARY_PNG_PREFIX.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            item_delay: Duration::from_millis(DEFAULT_ITEM_DELAY_MS),
            progress: None,
        }
    }

    #[must_use]
    pub fn with_png_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.png_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn with_item_delay(mut self, item_delay: Duration) -> Self {
        self.item_delay = item_delay;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Convert the mapping file at `path` in place, saving after every batch.
    ///
    /// Returns the updated mapping and the conversion counts.
    pub async fn convert_file(
        &self,
        path: &Path,
    ) -> Result<(BTreeMap<PunkId, String>, ConversionReport)> {
        let target = path.to_path_buf();
        let mapping: BTreeMap<PunkId, String> =
            tokio::task::spawn_blocking(move || read_json_file(&target))
                .await
                .context("Mapping read task failed")??;
        info!(entries = mapping.len(), "Converting SVG URLs to PNG URLs");

        let mut updated = mapping.clone();
        let mut report = ConversionReport {
            total: mapping.len(),
            ..ConversionReport::default()
        };

        let entries: Vec<(PunkId, String)> = mapping.into_iter().collect();
        let batch_count = entries.len().div_ceil(self.batch_size);

        for (index, batch) in entries.chunks(self.batch_size).enumerate() {
            for (position, (id, url)) in batch.iter().enumerate() {
                if position > 0 {
                    sleep(self.item_delay).await;
                }
                if let Some(png) = self.convert_one(*id, url, &mut report).await {
                    updated.insert(*id, png);
                }
                if let Some(progress) = &self.progress {
                    progress.inc(1);
                }
            }

            save(path.to_path_buf(), updated.clone()).await?;
            info!("Batch {}/{} saved", index + 1, batch_count);
        }

        Ok((updated, report))
    }

    async fn convert_one(
        &self,
        id: PunkId,
        url: &str,
        report: &mut ConversionReport,
    ) -> Option<String> {
        if ImageKind::classify(url) != ImageKind::Svg {
            report.skipped += 1;
            return None;
        }

        let Some(candidate) = png_url_for(url, &self.png_prefix) else {
            warn!(%id, url, "No hash in SVG URL, keeping it");
            report.kept += 1;
            return None;
        };

        if self.checker.is_reachable(&candidate).await {
            debug!(%id, "Converted to PNG URL");
            report.converted += 1;
            Some(candidate)
        } else {
            warn!(%id, "PNG URL not reachable, keeping SVG");
            report.kept += 1;
            None
        }
    }
}

async fn save(path: PathBuf, mapping: BTreeMap<PunkId, String>) -> Result<()> {
    tokio::task::spawn_blocking(move || write_json_file(&path, &mapping, true))
        .await
        .context("Mapping write task failed")?
}
