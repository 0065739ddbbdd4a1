//! Durable id → image URL mapping.
//!
//! The store keeps the whole mapping in memory and mirrors it to a single
//! JSON file (`openseaCdnMapping.json`). Every write persists the *entire*
//! map through [`atomic_write`], so the file on disk is always a complete,
//! parseable copy and the in-memory map is always a superset of it.
//!
//! # Write failures
//!
//! When the durable write fails, [`MappingStore::put`] returns
//! [`PunksError::PersistenceFailed`] and the new entry **stays** in memory.
//! The URL was fetched successfully and remains servable for the lifetime of
//! the process; the next successful write (another `put` or a batch
//! [`flush`](MappingStore::flush)) carries it to disk.
//!
//! # Concurrency
//!
//! Mutations hold an async mutex across insert, serialization and the file
//! write, so concurrent `put` calls never interleave file content. Two writers
//! for the same id resolve as last-write-wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::core::{PunkId, PunksError};
use crate::utils::fs::atomic_write;

/// In-memory mapping mirrored to one JSON file.
#[derive(Debug)]
pub struct MappingStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<PunkId, String>>,
}

impl MappingStore {
    /// Create an empty store backed by `path` without touching the file system.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_entries(path, BTreeMap::new())
    }

    /// Create a store with pre-populated entries, without touching the file system.
    pub fn with_entries(path: impl Into<PathBuf>, entries: BTreeMap<PunkId, String>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(entries),
        }
    }

    /// Load the mapping from `path`.
    ///
    /// A missing file yields an empty store; the file is created by the first
    /// successful write.
    ///
    /// # Errors
    ///
    /// - [`PunksError::MappingParseError`] if the file is not a flat JSON
    ///   object of decimal ids to strings
    /// - [`PunksError::IoError`] if the file exists but cannot be read
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, PunksError> {
        let path = path.into();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No mapping file yet, starting empty");
                return Ok(Self::new(path));
            }
            Err(e) => return Err(PunksError::IoError(e)),
        };

        let entries: BTreeMap<PunkId, String> =
            serde_json::from_str(&content).map_err(|e| PunksError::MappingParseError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!(path = %path.display(), entries = entries.len(), "Loaded mapping");
        Ok(Self::with_entries(path, entries))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored URL for `id`, if any.
    pub async fn get(&self, id: PunkId) -> Option<String> {
        self.entries.lock().await.get(&id).cloned()
    }

    /// Whether `id` has a durable URL.
    pub async fn contains(&self, id: PunkId) -> bool {
        self.entries.lock().await.contains_key(&id)
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Copy of the current mapping.
    pub async fn snapshot(&self) -> BTreeMap<PunkId, String> {
        self.entries.lock().await.clone()
    }

    /// Insert `url` for `id` and persist the whole map before returning.
    ///
    /// On error the entry is still present in memory (see the module docs).
    pub async fn put(&self, id: PunkId, url: impl Into<String>) -> Result<(), PunksError> {
        let mut entries = self.entries.lock().await;
        entries.insert(id, url.into());
        let result = self.persist(&entries).await;
        if let Err(ref e) = result {
            warn!(%id, error = %e, "Mapping entry kept in memory but not persisted");
        }
        result
    }

    /// Persist the current map (batch checkpoint and shutdown flush).
    pub async fn flush(&self) -> Result<(), PunksError> {
        let entries = self.entries.lock().await;
        self.persist(&entries).await
    }

    async fn persist(&self, entries: &BTreeMap<PunkId, String>) -> Result<(), PunksError> {
        let failed = |reason: String| PunksError::PersistenceFailed {
            path: self.path.display().to_string(),
            reason,
        };

        let json = serde_json::to_string_pretty(entries).map_err(|e| failed(e.to_string()))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || atomic_write(&path, json.as_bytes()))
            .await
            .map_err(|e| failed(format!("write task panicked: {e}")))?
            .map_err(|e| failed(format!("{e:#}")))?;

        debug!(path = %self.path.display(), entries = entries.len(), "Persisted mapping");
        Ok(())
    }
}
