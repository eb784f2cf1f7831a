//! Template normalization.
//!
//! Raw template metadata is heterogeneous (workspace folder sets, literal
//! config files, pack directories). Normalization flattens it into the four
//! uniform shapes the applier handles, so no type-sniffing leaks past this
//! module.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::descriptor::ContentDescriptor;

/// Loosely-typed template input, as produced by the cache or supplied by a
/// caller over the operations boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSpec {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub source_path: Option<PathBuf>,
    /// Pack-relative directory to copy; presence makes this a pack template.
    #[serde(default)]
    pub pack_path: Option<PathBuf>,
    #[serde(default)]
    pub folders: Option<Vec<String>>,
    #[serde(default)]
    pub content: Option<LineContent>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub files: Option<IndexMap<String, String>>,
}

/// Literal file content, accepted as either a list of lines or a single
/// newline-separated string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineContent {
    Lines(Vec<String>),
    Text(String),
}

impl LineContent {
    fn into_lines(self) -> Vec<String> {
        match self {
            LineContent::Lines(lines) => lines,
            LineContent::Text(text) => text
                .split('\n')
                .map(|line| line.trim_end_matches('\r').to_string())
                .collect(),
        }
    }
}

/// A template resolved to one of the four shapes the applier understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedTemplate {
    /// A set of folders to create under the destination.
    Workspace {
        id: String,
        name: String,
        folders: Vec<String>,
    },
    /// A named file with literal line content.
    Gitignore {
        id: String,
        name: String,
        filename: String,
        lines: Vec<String>,
    },
    /// A named file with literal line content.
    Env {
        id: String,
        name: String,
        filename: String,
        lines: Vec<String>,
    },
    /// A pack directory (or explicit file map) to copy verbatim.
    Pack {
        id: String,
        name: String,
        pack_path: PathBuf,
        files: Option<IndexMap<String, String>>,
    },
}

impl NormalizedTemplate {
    pub fn id(&self) -> &str {
        match self {
            NormalizedTemplate::Workspace { id, .. }
            | NormalizedTemplate::Gitignore { id, .. }
            | NormalizedTemplate::Env { id, .. }
            | NormalizedTemplate::Pack { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NormalizedTemplate::Workspace { name, .. }
            | NormalizedTemplate::Gitignore { name, .. }
            | NormalizedTemplate::Env { name, .. }
            | NormalizedTemplate::Pack { name, .. } => name,
        }
    }
}

/// Resolve a loosely-typed spec into a normalized template, or `None` when
/// the shape is unrecognized (such entries are skipped by callers).
pub fn normalize(spec: TemplateSpec) -> Option<NormalizedTemplate> {
    let id = spec.id.clone().unwrap_or_else(|| spec.name.clone());
    let name = spec.name.clone();

    if let Some(pack_path) = spec.pack_path {
        let files = spec.files.filter(|files| !files.is_empty());
        return Some(NormalizedTemplate::Pack {
            id,
            name,
            pack_path,
            files,
        });
    }

    match spec.category.as_deref() {
        Some("workspace") => Some(NormalizedTemplate::Workspace {
            id,
            name,
            folders: spec.folders.unwrap_or_default(),
        }),
        Some("gitignore") => Some(NormalizedTemplate::Gitignore {
            id,
            name,
            filename: spec
                .file_name
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| ".gitignore".to_string()),
            lines: spec.content.map(LineContent::into_lines).unwrap_or_default(),
        }),
        Some("env") => {
            // The source path may hint at the filename, e.g.
            // configuration/env-frontend.json -> .env-frontend
            let hinted = spec.source_path.as_deref().and_then(|p| {
                p.file_stem()
                    .map(|stem| format!(".{}", stem.to_string_lossy()))
            });
            let filename = spec
                .file_name
                .filter(|f| !f.is_empty())
                .or(hinted)
                .unwrap_or_else(|| ".env".to_string());
            Some(NormalizedTemplate::Env {
                id,
                name,
                filename,
                lines: spec.content.map(LineContent::into_lines).unwrap_or_default(),
            })
        }
        _ => None,
    }
}

impl From<&ContentDescriptor> for TemplateSpec {
    fn from(descriptor: &ContentDescriptor) -> Self {
        TemplateSpec {
            id: Some(descriptor.id.clone()),
            name: descriptor.name.clone(),
            category: Some(descriptor.category.clone()),
            source_path: Some(descriptor.source_path.clone()),
            pack_path: Some(descriptor.source_path.clone()),
            folders: None,
            content: None,
            file_name: None,
            files: Some(descriptor.files.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> TemplateSpec {
        TemplateSpec {
            name: name.to_string(),
            ..TemplateSpec::default()
        }
    }

    #[test]
    fn test_pack_path_wins_over_category() {
        let mut input = spec("react-app");
        input.category = Some("workspace".to_string());
        input.pack_path = Some(PathBuf::from("demo/templates/react-app"));

        let normalized = normalize(input).unwrap();
        assert!(matches!(normalized, NormalizedTemplate::Pack { .. }));
    }

    #[test]
    fn test_workspace_folders() {
        let mut input = spec("default-workspace");
        input.category = Some("workspace".to_string());
        input.folders = Some(vec!["src".to_string(), "docs".to_string()]);

        match normalize(input).unwrap() {
            NormalizedTemplate::Workspace { folders, .. } => {
                assert_eq!(folders, vec!["src", "docs"]);
            }
            other => panic!("expected workspace, got {:?}", other),
        }
    }

    #[test]
    fn test_gitignore_defaults_filename() {
        let mut input = spec("node-gitignore");
        input.category = Some("gitignore".to_string());
        input.content = Some(LineContent::Text("node_modules\ndist".to_string()));

        match normalize(input).unwrap() {
            NormalizedTemplate::Gitignore { filename, lines, .. } => {
                assert_eq!(filename, ".gitignore");
                assert_eq!(lines, vec!["node_modules", "dist"]);
            }
            other => panic!("expected gitignore, got {:?}", other),
        }
    }

    #[test]
    fn test_env_filename_hinted_from_source_path() {
        let mut input = spec("env-frontend");
        input.category = Some("env".to_string());
        input.source_path = Some(PathBuf::from("configuration/env-frontend.json"));
        input.content = Some(LineContent::Lines(vec!["API_URL=http://localhost".to_string()]));

        match normalize(input).unwrap() {
            NormalizedTemplate::Env { filename, .. } => {
                assert_eq!(filename, ".env-frontend");
            }
            other => panic!("expected env, got {:?}", other),
        }
    }

    #[test]
    fn test_explicit_filename_beats_hint() {
        let mut input = spec("env-frontend");
        input.category = Some("env".to_string());
        input.source_path = Some(PathBuf::from("configuration/env-frontend.json"));
        input.file_name = Some(".env.local".to_string());

        match normalize(input).unwrap() {
            NormalizedTemplate::Env { filename, .. } => assert_eq!(filename, ".env.local"),
            other => panic!("expected env, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_shape_is_none() {
        let mut input = spec("mystery");
        input.category = Some("other".to_string());
        assert!(normalize(input).is_none());
        assert!(normalize(spec("bare")).is_none());
    }

    #[test]
    fn test_line_content_crlf() {
        let content = LineContent::Text("a\r\nb\r\n".to_string());
        assert_eq!(content.into_lines(), vec!["a", "b", ""]);
    }

    #[test]
    fn test_empty_file_map_treated_as_undeclared() {
        let mut input = spec("react-app");
        input.pack_path = Some(PathBuf::from("demo/templates/react-app"));
        input.files = Some(IndexMap::new());

        match normalize(input).unwrap() {
            NormalizedTemplate::Pack { files, .. } => assert!(files.is_none()),
            other => panic!("expected pack, got {:?}", other),
        }
    }
}
