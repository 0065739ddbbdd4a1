//! Catalog queries printed as JSON.

use anyhow::Result;
use clap::Args;

use super::common::{CommandContext, print_json};
use crate::catalog::{Dataset, FilterQuery, PunkService};

#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Punk id.
    id: String,
}

impl ShowCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let service = PunkService::from_config(&ctx.config).await?;
        let punk = service.find_str(&self.id).await?;
        service.images().shutdown().await?;
        print_json(&punk)
    }
}

#[derive(Args, Debug)]
pub struct ListCommand {}

impl ListCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let service = PunkService::from_config(&ctx.config).await?;
        let punks = service.find_all().await;
        service.images().shutdown().await?;
        print_json(&punks)
    }
}

#[derive(Args, Debug)]
pub struct TypesCommand {}

impl TypesCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let dataset = Dataset::load(&ctx.config.dataset_path()).await?;
        print_json(&dataset.types())
    }
}

#[derive(Args, Debug)]
pub struct AccessoriesCommand {}

impl AccessoriesCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let dataset = Dataset::load(&ctx.config.dataset_path()).await?;
        print_json(&dataset.accessories())
    }
}

#[derive(Args, Debug)]
pub struct FilterCommand {
    /// Punk type, or `any`.
    #[arg(value_name = "TYPE")]
    punk_type: String,

    /// Comma-separated accessory terms, or `any`.
    accessories: String,

    /// Maximum number of punks returned.
    #[arg(long)]
    limit: Option<usize>,
}

impl FilterCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let query = FilterQuery::parse(&self.punk_type, &self.accessories, self.limit);
        let service = PunkService::from_config(&ctx.config).await?;
        let punks = service.filter(&query).await;
        service.images().shutdown().await?;
        print_json(&punks)
    }
}
