//! Consolidated dataset snapshot (`cryptoPunkData-Alchemy.json`).
//!
//! The snapshot is the dataset with every `image` replaced by the served URL:
//! the mapping entry when there is one, the fallback URL otherwise. It is
//! derived data and is regenerated in full from the dataset and the mapping.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use super::dataset::Dataset;
use crate::core::{ImageKind, PunkId, fallback_url};
use crate::utils::fs::write_json_file;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    #[serde(rename = "type")]
    pub punk_type: String,
    pub accessories: Vec<String>,
    pub image: String,
}

/// Counts describing a generated snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub total: usize,
    /// Entries served from the mapping.
    pub mapped: usize,
    pub svg: usize,
    pub png: usize,
    pub other: usize,
}

/// Build the snapshot for `dataset` against `mapping`.
pub fn build(
    dataset: &Dataset,
    mapping: &BTreeMap<PunkId, String>,
) -> BTreeMap<PunkId, SnapshotEntry> {
    dataset
        .iter()
        .map(|(id, punk)| {
            let image = mapping.get(&id).cloned().unwrap_or_else(|| fallback_url(id));
            let entry = SnapshotEntry {
                punk_type: punk.punk_type.clone(),
                accessories: punk.accessories.clone(),
                image,
            };
            (id, entry)
        })
        .collect()
}

pub fn summarize(
    snapshot: &BTreeMap<PunkId, SnapshotEntry>,
    mapping: &BTreeMap<PunkId, String>,
) -> SnapshotSummary {
    let mut summary = SnapshotSummary {
        total: snapshot.len(),
        ..SnapshotSummary::default()
    };
    for (id, entry) in snapshot {
        if mapping.contains_key(id) {
            summary.mapped += 1;
        }
        match ImageKind::classify(&entry.image) {
            ImageKind::Svg => summary.svg += 1,
            ImageKind::Png => summary.png += 1,
            ImageKind::Other => summary.other += 1,
        }
    }
    summary
}

/// Build the snapshot and write it to `path`, pretty-printed.
pub async fn regenerate(
    dataset: &Dataset,
    mapping: &BTreeMap<PunkId, String>,
    path: &Path,
) -> Result<(BTreeMap<PunkId, SnapshotEntry>, SnapshotSummary)> {
    let snapshot = build(dataset, mapping);
    let summary = summarize(&snapshot, mapping);

    let target = path.to_path_buf();
    let data = snapshot.clone();
    tokio::task::spawn_blocking(move || write_json_file(&target, &data, true))
        .await
        .context("Snapshot write task failed")??;

    info!(path = %path.display(), total = summary.total, mapped = summary.mapped, "Snapshot regenerated");
    Ok((snapshot, summary))
}
