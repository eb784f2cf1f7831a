//! Create command - scaffold a new project from installed templates.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, MultiSelect, Select};
use std::path::{Path, PathBuf};

use packhub_pm::applier::{OverwriteAll, SkipAll};
use packhub_pm::project::{write_project_metadata, ProjectMeta};
use packhub_pm::{
    ConflictChoice, ConflictDecision, ConflictResolver, ContentDescriptor, TemplateSpec,
};

use crate::config::build_ops;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Project name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Template to apply (id or name, repeatable). Prompts when omitted.
    #[arg(short = 't', long = "template", value_name = "TEMPLATE")]
    pub templates: Vec<String>,

    /// Library to apply after the templates (id or name, repeatable)
    #[arg(short = 'l', long = "library", value_name = "LIBRARY")]
    pub libraries: Vec<String>,

    /// Target directory (default: <root>/projects/<NAME>)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Overwrite existing files without asking
    #[arg(long, conflicts_with = "skip_existing")]
    pub force: bool,

    /// Keep existing files without asking
    #[arg(long)]
    pub skip_existing: bool,

    /// Managed root directory (default: ~/.packhub)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

pub async fn execute(args: CreateArgs) -> Result<i32> {
    let (ops, paths) = build_ops(args.root.clone())?;
    let destination = args
        .directory
        .clone()
        .unwrap_or_else(|| paths.projects_dir().join(&args.name));

    let available = unwrap_listing(ops.list_templates("cli").await)?;
    if available.is_empty() {
        eprintln!(
            "{} No templates installed. Run 'packhub install <pack>' first.",
            style("Error:").red().bold()
        );
        return Ok(1);
    }

    let selected = if args.templates.is_empty() {
        prompt_selection(&available)?
    } else {
        match_requested(&available, &args.templates)?
    };

    let mut specs: Vec<TemplateSpec> = selected.iter().map(|d| TemplateSpec::from(*d)).collect();
    let mut applied_libraries = Vec::new();

    if !args.libraries.is_empty() {
        let libraries = unwrap_listing(ops.list_libraries().await)?;
        let chosen = match_requested(&libraries, &args.libraries)?;
        applied_libraries = chosen.iter().map(|d| d.id.clone()).collect();
        specs.extend(chosen.iter().map(|d| TemplateSpec::from(*d)));
    }

    println!(
        "{} Creating {} in {}",
        style("Info:").cyan(),
        style(&args.name).white().bold(),
        destination.display()
    );

    let outcome = if args.force {
        ops.apply_templates(&destination, specs, &OverwriteAll).await
    } else if args.skip_existing {
        ops.apply_templates(&destination, specs, &SkipAll).await
    } else {
        ops.apply_templates(&destination, specs, &PromptResolver).await
    };

    if outcome.is_cancelled() {
        println!("{} Cancelled, nothing else was written", style("Info:").cyan());
        return Ok(1);
    }
    if !outcome.ok {
        eprintln!(
            "{} {}",
            style("Error:").red().bold(),
            outcome.error.unwrap_or_else(|| "apply failed".to_string())
        );
        return Ok(1);
    }

    let meta = ProjectMeta {
        name: args.name.clone(),
        description: String::new(),
        version: Some("1.0.0".to_string()),
        last_edited: Utc::now(),
        path: destination.clone(),
        template_used: selected.iter().map(|d| d.id.clone()).collect(),
        libraries_applied: applied_libraries,
    };
    write_project_metadata(&destination, &meta)
        .await
        .context("Failed to write project metadata")?;

    println!(
        "{} Created project in {}",
        style("Success:").green().bold(),
        destination.display()
    );
    Ok(0)
}

fn unwrap_listing(
    outcome: packhub_pm::Outcome<Vec<ContentDescriptor>>,
) -> Result<Vec<ContentDescriptor>> {
    match (outcome.ok, outcome.data) {
        (true, Some(data)) => Ok(data),
        _ => bail!(
            "listing failed: {}",
            outcome.error.unwrap_or_else(|| "unknown error".to_string())
        ),
    }
}

/// Match requested ids or names against the installed descriptors, in the
/// order they were requested.
fn match_requested<'a>(
    available: &'a [ContentDescriptor],
    requested: &[String],
) -> Result<Vec<&'a ContentDescriptor>> {
    let mut matched = Vec::new();
    for wanted in requested {
        let found = available
            .iter()
            .find(|d| d.id == *wanted || d.name == *wanted);
        match found {
            Some(descriptor) => matched.push(descriptor),
            None => bail!("'{}' is not installed", wanted),
        }
    }
    Ok(matched)
}

fn prompt_selection(available: &[ContentDescriptor]) -> Result<Vec<&ContentDescriptor>> {
    let labels: Vec<String> = available
        .iter()
        .map(|d| format!("{} ({})", d.name, d.category))
        .collect();
    let picked = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Select templates to apply")
        .items(&labels)
        .interact()
        .context("Template selection aborted")?;
    if picked.is_empty() {
        bail!("no templates selected");
    }
    Ok(picked.into_iter().map(|i| &available[i]).collect())
}

/// Asks the user per conflicting file, with "all" variants that stick for
/// the rest of the run.
struct PromptResolver;

#[async_trait]
impl ConflictResolver for PromptResolver {
    async fn resolve(&self, target: &Path) -> ConflictChoice {
        let prompt = format!("{} already exists", target.display());
        let picked = tokio::task::spawn_blocking(move || {
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .items(&[
                    "Overwrite",
                    "Overwrite all",
                    "Skip",
                    "Skip all",
                    "Cancel",
                ])
                .default(0)
                .interact()
        })
        .await;

        match picked {
            Ok(Ok(0)) => ConflictChoice::once(ConflictDecision::Overwrite),
            Ok(Ok(1)) => ConflictChoice::sticky(ConflictDecision::Overwrite),
            Ok(Ok(2)) => ConflictChoice::once(ConflictDecision::Skip),
            Ok(Ok(3)) => ConflictChoice::sticky(ConflictDecision::Skip),
            // Explicit cancel, a closed prompt or a panicked task all abort
            _ => ConflictChoice::once(ConflictDecision::Cancel),
        }
    }
}
