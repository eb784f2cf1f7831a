//! Remove command - delete an installed pack.

use anyhow::Result;
use clap::Args;
use console::style;
use dialoguer::Confirm;
use std::path::PathBuf;

use crate::config::build_ops;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Name of the installed pack
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Managed root directory (default: ~/.packhub)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

pub async fn execute(args: RemoveArgs) -> Result<i32> {
    let (ops, _) = build_ops(args.root.clone())?;

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove pack '{}'?", args.name))
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            println!("{} Aborted", style("Info:").cyan());
            return Ok(0);
        }
    }

    let outcome = ops.remove_pack(&args.name, None).await;
    if outcome.ok {
        println!(
            "{} Removed {}",
            style("Success:").green().bold(),
            style(&args.name).white().bold()
        );
        Ok(0)
    } else {
        eprintln!(
            "{} {}",
            style("Error:").red().bold(),
            outcome.error.unwrap_or_else(|| "remove failed".to_string())
        );
        Ok(1)
    }
}
