//! Rewrite mapped SVG URLs to PNG URLs.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::sync::Arc;

use super::common::CommandContext;
use crate::cache::MappingStore;
use crate::catalog::{Dataset, snapshot};
use crate::repair::{HttpHeadCheck, PngConverter};

#[derive(Args, Debug)]
pub struct ConvertPngCommand {
    /// Entries per saved batch.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Skip regenerating the snapshot afterwards.
    #[arg(long)]
    no_snapshot: bool,
}

impl ConvertPngCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let config = &ctx.config;
        let mapping_path = config.mapping_path();

        let checker = HttpHeadCheck::new(config.retry_policy().attempt_timeout())?;
        let total = MappingStore::load(&mapping_path).await?.len().await;
        let progress = ctx.progress_bar(total as u64);
        progress.set_prefix("Probing");

        let converter = PngConverter::new(Arc::new(checker))
            .with_batch_size(self.batch_size.unwrap_or(config.batch_size))
            .with_item_delay(config.batch_options().item_delay)
            .with_progress(progress.clone());

        let (mapping, report) = converter
            .convert_file(&mapping_path)
            .await
            .with_context(|| format!("Failed to convert {}", mapping_path.display()))?;
        progress.finish_and_clear();

        println!("{}", "🎉 Conversion completed!".green().bold());
        println!("📊 Total URLs: {}", report.total);
        println!("📊 Converted to PNG: {}", report.converted);
        println!("📊 Kept as SVG: {}", report.kept);
        println!("📊 Not SVG (untouched): {}", report.skipped);

        if !self.no_snapshot {
            let dataset = Dataset::load(&config.dataset_path()).await?;
            snapshot::regenerate(&dataset, &mapping, &config.snapshot_path()).await?;
            println!("✅ {} regenerated", config.snapshot_file);
        }
        Ok(())
    }
}
