//! Project metadata (`metadata.yaml` inside each created project).
//!
//! Written by the applier's caller after a successful apply, never by the
//! applier itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::Result;

pub const PROJECT_METADATA_FILE: &str = "metadata.yaml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: Option<String>,
    pub last_edited: DateTime<Utc>,
    pub path: PathBuf,
    #[serde(default)]
    pub template_used: Vec<String>,
    #[serde(default)]
    pub libraries_applied: Vec<String>,
}

/// Persist a project's metadata inside its directory.
pub async fn write_project_metadata(project_dir: &Path, meta: &ProjectMeta) -> Result<()> {
    tokio::fs::create_dir_all(project_dir).await?;
    let raw = serde_yaml::to_string(meta)?;
    tokio::fs::write(project_dir.join(PROJECT_METADATA_FILE), raw).await?;
    Ok(())
}

/// List every project under `projects_dir` that carries readable metadata.
/// Malformed or missing metadata skips that project; an unreadable projects
/// root fails the call.
pub async fn list_projects(projects_dir: &Path) -> Result<Vec<ProjectMeta>> {
    let mut entries = tokio::fs::read_dir(projects_dir).await?;
    let mut projects = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let meta_path = entry.path().join(PROJECT_METADATA_FILE);
        let raw = match tokio::fs::read_to_string(&meta_path).await {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        match serde_yaml::from_str::<ProjectMeta>(&raw) {
            Ok(meta) => projects.push(meta),
            Err(e) => {
                log::warn!("skipping malformed project metadata {}: {}", meta_path.display(), e);
            }
        }
    }

    projects.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(projects)
}
