//! Static punk dataset and its queries.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

use crate::constants::DEFAULT_FILTER_LIMIT;
use crate::core::{PunkId, PunksError};

/// One record of `cryptoPunkData.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePunk {
    #[serde(rename = "type")]
    pub punk_type: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub accessories: Vec<String>,
}

/// The whole dataset, keyed and iterated in numeric id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    punks: BTreeMap<PunkId, BasePunk>,
}

impl Dataset {
    pub fn new(punks: BTreeMap<PunkId, BasePunk>) -> Self {
        Self { punks }
    }

    /// Read and parse the dataset file.
    ///
    /// # Errors
    ///
    /// - [`PunksError::DatasetNotFound`] if the file does not exist
    /// - [`PunksError::DatasetParseError`] if it is not an id-keyed object of
    ///   punk records
    pub async fn load(path: &Path) -> Result<Self, PunksError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PunksError::DatasetNotFound {
                    path: path.display().to_string(),
                });
            }
            Err(e) => return Err(PunksError::IoError(e)),
        };

        let punks: BTreeMap<PunkId, BasePunk> =
            serde_json::from_str(&content).map_err(|e| PunksError::DatasetParseError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!(path = %path.display(), punks = punks.len(), "Loaded dataset");
        Ok(Self::new(punks))
    }

    pub fn len(&self) -> usize {
        self.punks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.punks.is_empty()
    }

    pub fn get(&self, id: PunkId) -> Option<&BasePunk> {
        self.punks.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = PunkId> + '_ {
        self.punks.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PunkId, &BasePunk)> {
        self.punks.iter().map(|(id, punk)| (*id, punk))
    }

    /// Distinct types in first-seen order.
    pub fn types(&self) -> Vec<String> {
        distinct(self.punks.values().map(|punk| punk.punk_type.as_str()))
    }

    /// Distinct non-empty accessories in first-seen order.
    pub fn accessories(&self) -> Vec<String> {
        distinct(
            self.punks
                .values()
                .flat_map(|punk| punk.accessories.iter().map(String::as_str))
                .filter(|accessory| !accessory.is_empty()),
        )
    }

    /// Matching punks, shuffled and truncated to the query limit.
    pub fn filter(&self, query: &FilterQuery) -> Vec<(PunkId, &BasePunk)> {
        self.filter_with_rng(query, &mut rand::thread_rng())
    }

    pub fn filter_with_rng<R: Rng + ?Sized>(
        &self,
        query: &FilterQuery,
        rng: &mut R,
    ) -> Vec<(PunkId, &BasePunk)> {
        let mut matches: Vec<_> = self.iter().filter(|(_, punk)| query.matches(punk)).collect();
        matches.shuffle(rng);
        matches.truncate(query.limit);
        matches
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values.filter(|value| seen.insert(*value)).map(str::to_string).collect()
}

/// Parsed type/accessories filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery {
    /// Exact type to match, `None` for any.
    pub punk_type: Option<String>,
    /// Lower-cased terms that must each appear in some accessory.
    pub accessories: Vec<String>,
    pub limit: usize,
}

impl FilterQuery {
    /// Parse the raw query strings.
    ///
    /// `"any"` (any case) disables a criterion. Types are normalized to
    /// `Capitalized` form; accessory terms are comma separated, trimmed and
    /// lower-cased, with empty terms dropped.
    pub fn parse(punk_type: &str, accessories: &str, limit: Option<usize>) -> Self {
        let punk_type = punk_type.trim();
        let punk_type = (!punk_type.eq_ignore_ascii_case("any")).then(|| capitalize(punk_type));

        let accessories = accessories.trim();
        let accessories = if accessories.eq_ignore_ascii_case("any") {
            Vec::new()
        } else {
            accessories
                .split(',')
                .map(|term| term.trim().to_lowercase())
                .filter(|term| !term.is_empty())
                .collect()
        };

        Self {
            punk_type,
            accessories,
            limit: limit.unwrap_or(DEFAULT_FILTER_LIMIT),
        }
    }

    pub fn matches(&self, punk: &BasePunk) -> bool {
        if self.punk_type.as_ref().is_some_and(|punk_type| punk.punk_type != *punk_type) {
            return false;
        }

        self.accessories.iter().all(|term| {
            punk.accessories.iter().any(|accessory| accessory.to_lowercase().contains(term))
        })
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
