//! Command-line interface for punks.
//!
//! Each subcommand lives in its own module with its argument struct and an
//! `execute` method taking the shared [`CommandContext`].
//!
//! # Available Commands
//!
//! ## Bulk tooling
//! - `update` - Resolve image URLs for every punk missing from the mapping
//! - `snapshot` - Regenerate `cryptoPunkData-Alchemy.json`
//! - `convert-png` - Rewrite mapped SVG URLs to PNG URLs
//!
//! ## Queries
//! - `resolve` - Resolve ids through the pipeline and print their URLs
//! - `show`, `list` - Punk records with served image URLs (JSON)
//! - `types`, `accessories` - Distinct values in the dataset (JSON)
//! - `filter` - Random sample of punks by type and accessories (JSON)
//!
//! # Examples
//!
//! ```bash
//! punks update                       # fetch everything still missing
//! punks update --concurrent 17 42    # just these two ids
//! punks --data-dir ./data filter alien "cap,earring" --limit 3
//! punks -v resolve 7804
//! ```
//!
//! Logs go to stderr so JSON output on stdout stays machine readable.

mod common;
mod convert;
mod query;
mod resolve;
mod snapshot;
mod update;


pub use common::CommandContext;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log level for this crate; `None` defers to `RUST_LOG`, then `info`.
    pub log_level: Option<String>,

    /// Hide progress bars.
    pub no_progress: bool,

    /// Explicit configuration file.
    pub config_path: Option<PathBuf>,

    /// Overrides the configured data directory.
    pub data_dir: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber. Only the first call has an effect.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(format!("warn,punks_cli={level},punks={level}")),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,punks_cli=info,punks=info")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// CryptoPunks image URL resolution and bulk tooling.
#[derive(Parser)]
#[command(
    name = "punks",
    about = "CryptoPunks metadata tooling - resolve, cache and export punk image URLs",
    version,
    long_about = "Resolves canonical punk image URLs through the Alchemy NFT API, caches them in \
                  openseaCdnMapping.json and regenerates the consolidated dataset."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug logging (equivalent to `RUST_LOG=punks_cli=debug`).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (default: `punks.toml`, or `PUNKS_CONFIG_PATH`).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the dataset, mapping and snapshot files.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Disable progress bars.
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch image URLs for every punk missing from the mapping.
    Update(update::UpdateCommand),

    /// Resolve ids through the mapping and provider.
    Resolve(resolve::ResolveCommand),

    /// Show one punk as JSON.
    Show(query::ShowCommand),

    /// List every punk as JSON.
    List(query::ListCommand),

    /// List the distinct punk types.
    Types(query::TypesCommand),

    /// List the distinct accessories.
    Accessories(query::AccessoriesCommand),

    /// Random sample of punks matching a type and accessories.
    Filter(query::FilterCommand),

    /// Regenerate the consolidated dataset from the dataset and the mapping.
    Snapshot(snapshot::SnapshotCommand),

    /// Replace mapped SVG URLs with reachable PNG renditions.
    #[command(name = "convert-png")]
    ConvertPng(convert::ConvertPngCommand),
}

impl Cli {
    /// Run the parsed command with settings derived from the global flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            config_path: self.config.clone(),
            data_dir: self.data_dir.clone(),
        }
    }

    /// Dispatch with an explicit [`CliConfig`]. Logging is left to the caller.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let ctx = CommandContext::load(&config).await?;

        match self.command {
            Commands::Update(cmd) => cmd.execute(&ctx).await,
            Commands::Resolve(cmd) => cmd.execute(&ctx).await,
            Commands::Show(cmd) => cmd.execute(&ctx).await,
            Commands::List(cmd) => cmd.execute(&ctx).await,
            Commands::Types(cmd) => cmd.execute(&ctx).await,
            Commands::Accessories(cmd) => cmd.execute(&ctx).await,
            Commands::Filter(cmd) => cmd.execute(&ctx).await,
            Commands::Snapshot(cmd) => cmd.execute(&ctx).await,
            Commands::ConvertPng(cmd) => cmd.execute(&ctx).await,
        }
    }
}
