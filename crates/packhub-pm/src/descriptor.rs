//! Derived template/library descriptors.
//!
//! Descriptors are pure derived data: they are recomputed from the on-disk
//! pack tree by the metadata cache and never persisted independently.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which manifest section a descriptor was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Template,
    Library,
}

impl ContentKind {
    /// Pack subdirectory holding entries of this kind.
    pub fn subdir(self) -> &'static str {
        match self {
            ContentKind::Template => "templates",
            ContentKind::Library => "libraries",
        }
    }
}

/// A named, versioned template or library derived from a pack's manifest
/// plus its corresponding subdirectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDescriptor {
    pub kind: ContentKind,
    /// `<pack-name>-<entry-name>`
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub category: String,
    pub editable: bool,
    pub last_modified: DateTime<Utc>,
    /// Pack-relative path of the entry's source directory. Always resolves
    /// inside the managed pack root.
    pub source_path: PathBuf,
    /// Declared `source -> target` file map, or the lazily discovered file
    /// listing when the manifest declares none. May be empty when discovery
    /// fails for this single entry.
    pub files: IndexMap<String, String>,
}
