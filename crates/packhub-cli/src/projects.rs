//! Projects command - list projects created under the managed root.

use anyhow::Result;
use clap::Args;
use console::style;
use std::path::PathBuf;

use packhub_pm::project::list_projects;

use crate::config::hub_paths;

#[derive(Args, Debug)]
pub struct ProjectsArgs {
    /// Managed root directory (default: ~/.packhub)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Print project metadata as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: ProjectsArgs) -> Result<i32> {
    let paths = hub_paths(args.root)?;
    let projects_dir = paths.projects_dir();

    if !projects_dir.exists() {
        println!("{} No projects yet", style("Info:").cyan());
        return Ok(0);
    }

    let projects = list_projects(&projects_dir).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(0);
    }

    if projects.is_empty() {
        println!("{} No projects yet", style("Info:").cyan());
        return Ok(0);
    }
    for project in &projects {
        println!(
            "  {} {}  {}",
            style(&project.name).white().bold(),
            style(project.version.as_deref().unwrap_or("-")).yellow(),
            style(project.last_edited.format("%Y-%m-%d %H:%M")).dim()
        );
    }
    Ok(0)
}
