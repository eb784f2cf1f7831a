//! List commands - templates, libraries, categories and installed packs.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;
use std::path::PathBuf;

use packhub_pm::{ContentDescriptor, Outcome};

use crate::config::build_ops;

#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// List templates from installed packs
    Templates(ListArgs),

    /// List libraries from installed packs
    Libraries(ListArgs),

    /// List template categories
    Categories(ListArgs),

    /// List installed packs
    Packs(ListArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Managed root directory (default: ~/.packhub)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Print the raw response envelope as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(command: ListCommands) -> Result<i32> {
    match command {
        ListCommands::Templates(args) => {
            let (ops, _) = build_ops(args.root.clone())?;
            let outcome = ops.list_templates("cli").await;
            render(&args, outcome, print_descriptors)
        }
        ListCommands::Libraries(args) => {
            let (ops, _) = build_ops(args.root.clone())?;
            let outcome = ops.list_libraries().await;
            render(&args, outcome, print_descriptors)
        }
        ListCommands::Categories(args) => {
            let (ops, _) = build_ops(args.root.clone())?;
            let outcome = ops.list_template_folders().await;
            render(&args, outcome, |categories: &Vec<String>| {
                for category in categories {
                    println!("  {}", category);
                }
            })
        }
        ListCommands::Packs(args) => {
            let (ops, _) = build_ops(args.root.clone())?;
            let outcome = ops.list_packs().await;
            render(&args, outcome, |packs: &Vec<packhub_pm::PackInfo>| {
                for pack in packs {
                    println!(
                        "  {} {}{}",
                        style(&pack.name).white().bold(),
                        style(pack.version.as_deref().unwrap_or("-")).yellow(),
                        pack.summary
                            .as_deref()
                            .map(|s| format!("  {}", s))
                            .unwrap_or_default()
                    );
                }
            })
        }
    }
}

fn render<T: Serialize>(
    args: &ListArgs,
    outcome: Outcome<T>,
    print: impl Fn(&T),
) -> Result<i32> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(if outcome.ok { 0 } else { 1 });
    }

    match (outcome.ok, outcome.data) {
        (true, Some(data)) => {
            print(&data);
            Ok(0)
        }
        _ => {
            eprintln!(
                "{} {}",
                style("Error:").red().bold(),
                outcome.error.unwrap_or_else(|| "unknown error".to_string())
            );
            Ok(1)
        }
    }
}

fn print_descriptors(descriptors: &Vec<ContentDescriptor>) {
    if descriptors.is_empty() {
        println!("{} Nothing installed yet", style("Info:").cyan());
        return;
    }
    for item in descriptors {
        println!(
            "  {} {} [{}]",
            style(&item.name).white().bold(),
            style(&item.version).yellow(),
            item.category
        );
        if !item.description.is_empty() {
            println!("    {}", style(&item.description).dim());
        }
    }
}
