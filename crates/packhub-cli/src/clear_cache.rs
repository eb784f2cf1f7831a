//! Clear-cache command - drop the in-process metadata cache and report.

use anyhow::Result;
use clap::Args;
use console::style;
use std::path::PathBuf;

use crate::config::build_ops;

#[derive(Args, Debug)]
pub struct ClearCacheArgs {
    /// Managed root directory (default: ~/.packhub)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

pub async fn execute(args: ClearCacheArgs) -> Result<i32> {
    let (ops, paths) = build_ops(args.root)?;
    let outcome = ops.clear_cache();
    if outcome.ok {
        println!(
            "{} Cleared metadata cache for {}",
            style("Success:").green().bold(),
            paths.packs_dir().display()
        );
        Ok(0)
    } else {
        eprintln!(
            "{} {}",
            style("Error:").red().bold(),
            outcome.error.unwrap_or_else(|| "clear failed".to_string())
        );
        Ok(1)
    }
}
