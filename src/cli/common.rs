//! Shared plumbing for CLI commands.

use anyhow::{Context, Result};
use serde::Serialize;

use super::CliConfig;
use crate::config::PunksConfig;
use crate::core::PunkId;
use crate::utils::ProgressBar;

/// Loaded configuration plus output preferences, handed to every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: PunksConfig,
    pub no_progress: bool,
}

impl CommandContext {
    /// Load `punks.toml` (or the `--config` file) and apply the CLI overrides.
    pub async fn load(cli: &CliConfig) -> Result<Self> {
        let mut config = PunksConfig::load_with_optional(cli.config_path.clone())
            .await
            .context("Failed to load configuration")?;
        if let Some(dir) = &cli.data_dir {
            config.data_dir.clone_from(dir);
        }

        Ok(Self {
            config,
            no_progress: cli.no_progress,
        })
    }

    pub fn progress_bar(&self, len: u64) -> ProgressBar {
        if self.no_progress {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(len)
        }
    }
}

/// Parse raw id arguments, failing on the first invalid one.
pub fn parse_ids(raw: &[String]) -> Result<Vec<PunkId>> {
    raw.iter()
        .map(|value| value.parse::<PunkId>().with_context(|| format!("Invalid punk id '{value}'")))
        .collect()
}

/// Pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
