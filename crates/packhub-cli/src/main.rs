mod clear_cache;
mod config;
mod create;
mod install;
mod list;
mod marketplace;
mod projects;
mod remove;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "packhub")]
#[command(about = "Project scaffolding from reusable packs")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List installed templates, libraries, categories or packs
    List {
        #[command(subcommand)]
        what: list::ListCommands,
    },

    /// Install a pack from a URL or the marketplace
    Install(install::InstallArgs),

    /// Remove an installed pack
    Remove(remove::RemoveArgs),

    /// Create a new project from installed templates
    Create(create::CreateArgs),

    /// Browse packs published in a marketplace
    Marketplace(marketplace::MarketplaceArgs),

    /// List created projects
    Projects(projects::ProjectsArgs),

    /// Drop the cached pack metadata
    ClearCache(clear_cache::ClearCacheArgs),
}

fn run() -> Result<i32> {
    env_logger::init();
    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| anyhow::anyhow!("Failed to create async runtime: {}", e))?;

    match args.command {
        Commands::List { what } => rt.block_on(list::execute(what)),
        Commands::Install(install_args) => rt.block_on(install::execute(install_args)),
        Commands::Remove(remove_args) => rt.block_on(remove::execute(remove_args)),
        Commands::Create(create_args) => rt.block_on(create::execute(create_args)),
        Commands::Marketplace(market_args) => rt.block_on(marketplace::execute(market_args)),
        Commands::Projects(projects_args) => rt.block_on(projects::execute(projects_args)),
        Commands::ClearCache(clear_args) => rt.block_on(clear_cache::execute(clear_args)),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
