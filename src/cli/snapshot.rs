//! Regenerate `cryptoPunkData-Alchemy.json`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{CommandContext, parse_ids};
use crate::cache::MappingStore;
use crate::catalog::{Dataset, snapshot};
use crate::core::ImageKind;

#[derive(Args, Debug)]
pub struct SnapshotCommand {
    /// Ids whose URLs are printed as a spot check.
    #[arg(long, value_delimiter = ',', default_values = ["100", "101", "102"])]
    samples: Vec<String>,
}

impl SnapshotCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let samples = parse_ids(&self.samples)?;
        let dataset = Dataset::load(&ctx.config.dataset_path()).await?;
        let mapping = MappingStore::load(ctx.config.mapping_path()).await?.snapshot().await;

        let (entries, summary) =
            snapshot::regenerate(&dataset, &mapping, &ctx.config.snapshot_path()).await?;

        println!("{}", format!("✅ {} regenerated", ctx.config.snapshot_file).green());
        println!("📊 Total entries: {}", summary.total);
        println!("📊 From mapping: {}", summary.mapped);
        println!("📊 SVG: {}  PNG: {}  other: {}", summary.svg, summary.png, summary.other);

        let present: Vec<_> =
            samples.iter().filter_map(|id| entries.get(id).map(|entry| (id, entry))).collect();
        if !present.is_empty() {
            println!("\n🔍 Sample URLs:");
        }
        for (id, entry) in present {
            println!("Punk {id}: {} - {}", ImageKind::classify(&entry.image).label(), entry.image);
        }
        Ok(())
    }
}
