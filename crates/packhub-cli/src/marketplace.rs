//! Marketplace command - browse packs published in a remote manifest.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::sync::Arc;

use packhub_pm::marketplace::{
    derive_marketplace_name, fetch_manifest, resolve_marketplace_url, OFFICIAL_MARKETPLACE_URL,
};
use packhub_pm::HttpClient;

#[derive(Args, Debug)]
pub struct MarketplaceArgs {
    /// Marketplace URL or `owner/repo` GitHub shorthand
    #[arg(value_name = "SOURCE", default_value = OFFICIAL_MARKETPLACE_URL)]
    pub source: String,

    /// Print the manifest entries as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: MarketplaceArgs) -> Result<i32> {
    let url = resolve_marketplace_url(&args.source)?;
    let http = Arc::new(HttpClient::new().context("Failed to create HTTP client")?);

    let packs = fetch_manifest(&http, &url)
        .await
        .context("Failed to fetch the marketplace manifest")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&packs)?);
        return Ok(0);
    }

    println!(
        "{} {} ({} packs)",
        style("Marketplace:").cyan(),
        derive_marketplace_name(&url),
        packs.len()
    );
    for pack in &packs {
        println!(
            "  {} {}{}",
            style(&pack.name).white().bold(),
            style(pack.version.as_deref().unwrap_or("-")).yellow(),
            pack.description
                .as_deref()
                .map(|d| format!("  {}", d))
                .unwrap_or_default()
        );
    }
    Ok(0)
}
