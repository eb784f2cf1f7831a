//! Install command - fetch a pack archive and install it into the pack root.

use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use packhub_pm::marketplace::{self, OFFICIAL_MARKETPLACE_URL};
use packhub_pm::HttpClient;

use crate::config::build_ops;

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Archive URL, or a pack name to look up in the marketplace
    #[arg(value_name = "PACK")]
    pub pack: String,

    /// Expected checksum (optionally `sha256:`-prefixed)
    #[arg(long, value_name = "CHECKSUM")]
    pub checksum: Option<String>,

    /// Marketplace to resolve pack names against
    #[arg(long, value_name = "SOURCE", default_value = OFFICIAL_MARKETPLACE_URL)]
    pub source: String,

    /// Managed root directory (default: ~/.packhub)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

pub async fn execute(args: InstallArgs) -> Result<i32> {
    let (ops, _) = build_ops(args.root.clone())?;

    let (url, checksum) = if is_direct_url(&args.pack) {
        (args.pack.clone(), args.checksum.clone())
    } else {
        resolve_from_marketplace(&args).await?
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("valid progress template"),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Installing from {}", url));

    let outcome = ops.install_pack(&url, checksum.as_deref()).await;
    spinner.finish_and_clear();

    if outcome.ok {
        println!(
            "{} Installed {}",
            style("Success:").green().bold(),
            style(packhub_pm::installer::derive_pack_name(&url)).white().bold()
        );
        Ok(0)
    } else {
        eprintln!(
            "{} {}",
            style("Error:").red().bold(),
            outcome.error.unwrap_or_else(|| "install failed".to_string())
        );
        Ok(1)
    }
}

fn is_direct_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://") || input.starts_with("file://")
}

/// Look a pack name up in the marketplace manifest and return its archive
/// URL and published checksum.
async fn resolve_from_marketplace(args: &InstallArgs) -> Result<(String, Option<String>)> {
    let manifest_url = marketplace::resolve_marketplace_url(&args.source)?;
    let http = Arc::new(HttpClient::new().context("Failed to create HTTP client")?);

    println!(
        "{} Resolving {} via {}",
        style("Info:").cyan(),
        style(&args.pack).white().bold(),
        marketplace::derive_marketplace_name(&manifest_url)
    );

    let packs = marketplace::fetch_manifest(&http, &manifest_url)
        .await
        .context("Failed to fetch the marketplace manifest")?;

    let Some(entry) = packs.iter().find(|p| p.name == args.pack) else {
        bail!("pack '{}' is not listed in the marketplace", args.pack);
    };

    // An explicit --checksum beats the published one
    let checksum = args.checksum.clone().or_else(|| entry.checksum.clone());
    Ok((entry.zip.clone(), checksum))
}
