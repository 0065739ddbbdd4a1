//! Bulk update of the image URL mapping.
//!
//! Resolves every dataset id (or the ids given on the command line) that has
//! no mapping yet, checkpointing the mapping after each batch, then
//! regenerates the consolidated snapshot.
//!
//! ```bash
//! punks update                      # whole collection
//! punks update --batch-size 10 1 2  # just ids 1 and 2
//! punks update --concurrent --burst # dispatch batches concurrently
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::sync::Arc;

use super::common::{CommandContext, parse_ids};
use crate::catalog::{Dataset, snapshot};
use crate::resolver::{BatchDispatch, BatchRunner, RateLimitMode, Resolver};

#[derive(Args, Debug)]
pub struct UpdateCommand {
    /// Only these ids (default: the whole dataset).
    #[arg(value_name = "ID")]
    ids: Vec<String>,

    /// Ids per batch.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Resolve the members of a batch concurrently.
    #[arg(long)]
    concurrent: bool,

    /// Let concurrent callers pass the rate limiter together.
    #[arg(long)]
    burst: bool,

    /// Skip regenerating the snapshot afterwards.
    #[arg(long)]
    no_snapshot: bool,
}

impl UpdateCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let mut config = ctx.config.clone();
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if self.concurrent {
            config.batch_dispatch = BatchDispatch::Concurrent;
        }
        if self.burst {
            config.rate_limit_mode = RateLimitMode::Burst;
        }
        config.validate()?;

        let dataset = Dataset::load(&config.dataset_path()).await?;
        let ids = if self.ids.is_empty() {
            dataset.ids().collect()
        } else {
            parse_ids(&self.ids)?
        };

        let resolver = Arc::new(
            Resolver::from_config(&config).await.context("Failed to set up the resolver")?,
        );
        let store = Arc::clone(resolver.store());

        println!("📊 Total punks: {}", dataset.len());
        println!("📊 Already mapped: {}", store.len().await);

        let progress = ctx.progress_bar(ids.len() as u64);
        progress.set_prefix("Resolving");
        let runner = BatchRunner::new(Arc::clone(&resolver), config.batch_options())
            .with_progress(progress.clone());

        let report = runner.run_all(ids).await;
        progress.finish_and_clear();

        resolver.shutdown().await.context("Final mapping flush failed")?;

        println!("\n{}", "🎉 Update completed!".green().bold());
        println!("📊 Requested: {}", report.total);
        println!("📊 Skipped (already mapped): {}", report.skipped);
        println!("📊 Fetched: {}", report.fetched);
        if report.fallback > 0 {
            println!("{}", format!("⚠️  Unresolved (fallback URL): {}", report.fallback).yellow());
        }
        if report.checkpoint_failures > 0 {
            println!(
                "{}",
                format!("⚠️  Batch checkpoints that failed: {}", report.checkpoint_failures)
                    .yellow()
            );
        }
        println!("📊 Mapped now: {}", store.len().await);

        if !self.no_snapshot {
            let (_, summary) =
                snapshot::regenerate(&dataset, &store.snapshot().await, &config.snapshot_path())
                    .await?;
            println!(
                "✅ {} regenerated ({} mapped of {})",
                config.snapshot_file, summary.mapped, summary.total
            );
        }

        Ok(())
    }
}
