//! Managed directory layout.
//!
//! Everything lives under one root (default `~/.packhub`): installed packs
//! under `packs/`, created projects under `projects/`.

use std::path::{Path, PathBuf};

use directories::UserDirs;

#[derive(Debug, Clone)]
pub struct HubPaths {
    root: PathBuf,
}

impl HubPaths {
    /// Layout under the user's home directory.
    pub fn from_home() -> Option<Self> {
        UserDirs::new().map(|dirs| Self::with_root(dirs.home_dir().join(".packhub")))
    }

    /// Layout under an explicit root (tests, CLI overrides).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn packs_dir(&self) -> PathBuf {
        self.root.join("packs")
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }
}
