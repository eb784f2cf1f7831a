//! Pack manifest (`metadata.yaml`) model.
//!
//! Missing fields fall back per entry-field -> pack-field -> hard default
//! (`1.0.0`, `workspace`, editable).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::paths::basename;
use crate::Result;

pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_CATEGORY: &str = "workspace";
pub const MANIFEST_FILE: &str = "metadata.yaml";

/// A `source -> target` file declaration inside a content entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

/// One declared template or library inside a pack manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub files: Option<Vec<FileEntry>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub editable: Option<bool>,
}

impl ContentEntry {
    /// Whether this entry declares the template/library directory `name`.
    /// Manifest paths may carry a `templates/` style prefix, so only the
    /// final segment is compared.
    pub fn matches(&self, name: &str) -> bool {
        self.path
            .as_deref()
            .map(|p| basename(p) == name)
            .unwrap_or(false)
    }
}

/// Parsed pack `metadata.yaml`. Unknown fields are ignored; a missing or
/// malformed manifest degrades to `PackManifest::default()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub technology: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub editable: Option<bool>,
    #[serde(default)]
    pub contents: Option<Vec<ContentEntry>>,
}

impl PackManifest {
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Read and parse a pack's manifest, degrading to defaults when the file
    /// is missing or malformed. Per-pack failures never abort a scan.
    pub async fn load_or_default(pack_root: &Path) -> Self {
        let manifest_path = pack_root.join(MANIFEST_FILE);
        match tokio::fs::read_to_string(&manifest_path).await {
            Ok(raw) => Self::parse(&raw).unwrap_or_else(|e| {
                log::warn!(
                    "Malformed manifest at {}, using defaults: {}",
                    manifest_path.display(),
                    e
                );
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Find the content entry declaring directory `name`, if any.
    pub fn entry_for(&self, name: &str) -> Option<&ContentEntry> {
        self.contents
            .as_deref()
            .and_then(|entries| entries.iter().find(|e| e.matches(name)))
    }

    pub fn version_or_default(&self) -> String {
        self.version
            .clone()
            .unwrap_or_else(|| DEFAULT_VERSION.to_string())
    }

    pub fn editable_or_default(&self) -> bool {
        self.editable.unwrap_or(true)
    }
}

/// Normalize declared file entries to an ordered `source -> target` map.
/// Entries without a source are dropped; a missing target defaults to the
/// source basename.
pub fn normalize_files(files: &[FileEntry]) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    for entry in files {
        let source = entry.source.as_deref().unwrap_or("").trim();
        if source.is_empty() {
            continue;
        }
        let target = entry
            .target
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| basename(source));
        map.insert(source.to_string(), target.to_string());
    }
    map
}
