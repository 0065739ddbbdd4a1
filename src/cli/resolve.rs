//! Resolve individual ids through the pipeline.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::common::{CommandContext, parse_ids, print_json};
use crate::resolver::{ResolutionSource, Resolver};

#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Punk ids.
    #[arg(value_name = "ID", required = true)]
    ids: Vec<String>,

    /// Print the resolutions as JSON.
    #[arg(long)]
    json: bool,
}

impl ResolveCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let ids = parse_ids(&self.ids)?;
        let resolver =
            Resolver::from_config(&ctx.config).await.context("Failed to set up the resolver")?;

        let mut resolutions = Vec::with_capacity(ids.len());
        for id in ids {
            resolutions.push(resolver.resolve_detailed(id).await);
        }
        resolver.shutdown().await.context("Final mapping flush failed")?;

        if self.json {
            return print_json(&resolutions);
        }

        for resolution in &resolutions {
            let source = match resolution.source {
                ResolutionSource::Cached => "cached".dimmed(),
                ResolutionSource::Fetched => "fetched".green(),
                ResolutionSource::Fallback => "fallback".yellow(),
            };
            println!("{}\t{}\t{}", resolution.id, resolution.url, source);
        }
        Ok(())
    }
}
