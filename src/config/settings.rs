//! `punks.toml` settings.
//!
//! Every field has a default, so an empty or missing file is a valid
//! configuration. Environment variables are applied on top of the file:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ALCHEMY_API_KEY` | `api_key` |
//! | `PUNKS_IMAGE_SOURCE` | `image_source` |
//! | `PUNKS_DATA_DIR` | `data_dir` |
//!
//! ```toml
//! image_source = "alchemy"
//! data_dir = "data"
//! rate_limit_ms = 100
//! rate_limit_mode = "serialized"
//! batch_size = 50
//! batch_dispatch = "sequential"
//! max_retries = 3
//! timeout_secs = 10
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

use super::ImageSource;
use crate::constants::{
    ALCHEMY_BASE_URL, CONFIG_FILE, DATASET_FILE, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_BATCH_DELAY_MS,
    DEFAULT_BATCH_SIZE, DEFAULT_ITEM_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_RATE_LIMIT_MS,
    MAPPING_FILE, PUNKS_CONTRACT_ADDRESS, SNAPSHOT_FILE,
};
use crate::core::PunksError;
use crate::resolver::{BatchDispatch, BatchOptions, RateLimitMode, RetryPolicy};

/// Overrides the configuration file location.
pub const CONFIG_PATH_ENV: &str = "PUNKS_CONFIG_PATH";
pub const API_KEY_ENV: &str = "ALCHEMY_API_KEY";
pub const IMAGE_SOURCE_ENV: &str = "PUNKS_IMAGE_SOURCE";
pub const DATA_DIR_ENV: &str = "PUNKS_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PunksConfig {
    pub image_source: ImageSource,

    /// Alchemy API key. Prefer `ALCHEMY_API_KEY` over storing it in the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub provider_base_url: String,
    pub contract_address: String,

    /// Directory holding the dataset, mapping and snapshot files.
    pub data_dir: PathBuf,
    pub dataset_file: String,
    pub mapping_file: String,
    pub snapshot_file: String,

    pub rate_limit_ms: u64,
    pub rate_limit_mode: RateLimitMode,

    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub item_delay_ms: u64,
    pub batch_dispatch: BatchDispatch,

    /// Provider attempts per resolution, including the first.
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Default for PunksConfig {
    fn default() -> Self {
        Self {
            image_source: ImageSource::default(),
            api_key: None,
            provider_base_url: ALCHEMY_BASE_URL.to_string(),
            contract_address: PUNKS_CONTRACT_ADDRESS.to_string(),
            data_dir: PathBuf::from("."),
            dataset_file: DATASET_FILE.to_string(),
            mapping_file: MAPPING_FILE.to_string(),
            snapshot_file: SNAPSHOT_FILE.to_string(),
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            rate_limit_mode: RateLimitMode::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay_ms: DEFAULT_BATCH_DELAY_MS,
            item_delay_ms: DEFAULT_ITEM_DELAY_MS,
            batch_dispatch: BatchDispatch::default(),
            max_retries: DEFAULT_MAX_ATTEMPTS,
            timeout_secs: DEFAULT_ATTEMPT_TIMEOUT.as_secs(),
        }
    }
}

impl PunksConfig {
    /// Load from `PUNKS_CONFIG_PATH` or `./punks.toml`, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// an override or the resulting configuration is invalid.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Like [`load`](Self::load) with an explicit file path taking precedence.
    ///
    /// An explicit path that does not exist is an error; the default path is
    /// allowed to be missing.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(&path).await?,
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load_from(&path).await?
                } else {
                    debug!(path = %path.display(), "No config file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse one configuration file without environment overrides.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(PunksError::from).with_context(
            || format!("Failed to parse config from {}", path.display()),
        )?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// `PUNKS_CONFIG_PATH` if set, otherwise `punks.toml` in the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV).map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from)
    }

    /// Apply overrides read through `lookup` (the process environment in
    /// production). Blank values are ignored.
    ///
    /// # Errors
    ///
    /// [`PunksError::InvalidImageSource`] for an unknown image source name.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), PunksError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = lookup(API_KEY_ENV) {
            self.api_key = Some(key.trim().to_string());
        }
        if let Some(source) = lookup(IMAGE_SOURCE_ENV) {
            self.image_source = source.parse()?;
        }
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), PunksError> {
        let invalid = |message: &str| {
            Err(PunksError::ConfigError {
                message: message.to_string(),
            })
        };

        if self.batch_size == 0 {
            return invalid("batch_size must be at least 1");
        }
        if self.max_retries == 0 {
            return invalid("max_retries must be at least 1");
        }
        if self.timeout_secs == 0 {
            return invalid("timeout_secs must be at least 1");
        }
        if self.provider_base_url.trim().is_empty() {
            return invalid("provider_base_url must not be empty");
        }
        Ok(())
    }

    /// API key for resolver-backed sources.
    pub fn require_api_key(&self) -> Result<&str, PunksError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(PunksError::MissingApiKey)
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(&self.dataset_file)
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.data_dir.join(&self.mapping_file)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }

    pub fn rate_limit_interval(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_secs(self.timeout_secs))
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            batch_size: self.batch_size,
            batch_delay: Duration::from_millis(self.batch_delay_ms),
            item_delay: Duration::from_millis(self.item_delay_ms),
            dispatch: self.batch_dispatch,
        }
    }
}
