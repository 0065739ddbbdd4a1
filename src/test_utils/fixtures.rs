//! Test fixtures for datasets and mapping files
//!
//! [`DatasetFixture`] writes a small `cryptoPunkData.json` into a fresh
//! temporary directory, optionally together with an `openseaCdnMapping.json`.

use anyhow::{Context, Result};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::constants::{DATASET_FILE, MAPPING_FILE, SNAPSHOT_FILE};

/// Temporary data directory holding a sample dataset.
pub struct DatasetFixture {
    dir: TempDir,
}

impl DatasetFixture {
    /// Six punks covering every type and a mix of accessories.
    ///
    /// | id | type | accessories |
    /// |----|------|-------------|
    /// | 0 | Female | Green Eye Shadow, Earring, Blonde Bob |
    /// | 1 | Male | Smile, Mohawk |
    /// | 2 | Female | Wild Hair |
    /// | 3 | Male | Wild Hair, Nerd Glasses, Pipe |
    /// | 4 | Zombie | (none) |
    /// | 5 | Alien | Earring, Cap Forward |
    pub fn sample() -> Result<Self> {
        Self::with_dataset(&sample_dataset())
    }

    /// `count` Male punks with ids `0..count` and no accessories.
    pub fn sequential(count: u32) -> Result<Self> {
        let entries: serde_json::Map<String, serde_json::Value> = (0..count)
            .map(|id| {
                (id.to_string(), json!({ "type": "Male", "image": "", "accessories": [] }))
            })
            .collect();
        Self::with_dataset(&serde_json::Value::Object(entries))
    }

    pub fn with_dataset(dataset: &serde_json::Value) -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temp directory")?;
        let fixture = Self { dir };
        fixture.write(DATASET_FILE, &serde_json::to_string_pretty(dataset)?)?;
        Ok(fixture)
    }

    /// Write a mapping file with `entries`.
    pub fn with_mapping(self, entries: &[(u32, &str)]) -> Result<Self> {
        let mapping: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(id, url)| (id.to_string(), json!(url)))
            .collect();
        self.write(MAPPING_FILE, &serde_json::to_string_pretty(&mapping)?)?;
        Ok(self)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.dir.path().join(DATASET_FILE)
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.dir.path().join(MAPPING_FILE)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.path().join(SNAPSHOT_FILE)
    }

    /// Parsed content of the mapping file.
    pub fn read_mapping(&self) -> Result<serde_json::Value> {
        let content = fs::read_to_string(self.mapping_path())
            .with_context(|| format!("Failed to read {}", self.mapping_path().display()))?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, name: &str, content: &str) -> Result<()> {
        let path = self.dir.path().join(name);
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}

fn sample_dataset() -> serde_json::Value {
    json!({
        "0": { "type": "Female", "image": "", "accessories": ["Green Eye Shadow", "Earring", "Blonde Bob"] },
        "1": { "type": "Male", "image": "", "accessories": ["Smile", "Mohawk"] },
        "2": { "type": "Female", "image": "", "accessories": ["Wild Hair"] },
        "3": { "type": "Male", "image": "", "accessories": ["Wild Hair", "Nerd Glasses", "Pipe"] },
        "4": { "type": "Zombie", "image": "", "accessories": [] },
        "5": { "type": "Alien", "image": "", "accessories": ["Earring", "Cap Forward"] }
    })
}
