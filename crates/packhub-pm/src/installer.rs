//! Pack installation pipeline: fetch, verify, extract, replace.
//!
//! `install` composes the HTTP client, checksum verification and zip
//! extraction to add or replace a pack directory. Extraction goes through a
//! staging directory inside the pack root and is renamed into place, so the
//! metadata cache never observes a half-extracted pack.

use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::archive::PackArchive;
use crate::cache::MetadataCache;
use crate::checksum;
use crate::http::HttpClient;
use crate::manifest::PackManifest;
use crate::paths::basename;
use crate::{HubError, Result};

/// An installed pack as listed from disk.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackInfo {
    pub name: String,
    pub summary: Option<String>,
    pub version: Option<String>,
    pub technology: Option<String>,
    pub license: Option<String>,
    pub path: PathBuf,
}

pub struct PackInstaller {
    http: Arc<HttpClient>,
    pack_root: PathBuf,
    cache: Arc<MetadataCache>,
}

impl PackInstaller {
    pub fn new(http: Arc<HttpClient>, pack_root: impl Into<PathBuf>, cache: Arc<MetadataCache>) -> Self {
        Self {
            http,
            pack_root: pack_root.into(),
            cache,
        }
    }

    /// Download, verify and install the pack archive at `url`, replacing any
    /// previously installed pack of the same name.
    ///
    /// When `expected_checksum` is supplied, a mismatch fails the operation
    /// before any extraction happens. The scratch download is deleted on
    /// every exit path.
    pub async fn install(&self, url: &str, expected_checksum: Option<&str>) -> Result<()> {
        tokio::fs::create_dir_all(&self.pack_root).await?;

        // TempPath deletes the scratch file on drop, covering failure paths
        let scratch = tempfile::Builder::new()
            .prefix("packhub-pack-")
            .suffix(".zip")
            .tempfile()?
            .into_temp_path();

        log::info!("downloading pack from {}", url);
        self.http
            .download(url, &scratch)
            .await
            .map_err(|e| match HubError::from(e) {
                HubError::DownloadFailed { reason, .. } => HubError::DownloadFailed {
                    url: url.to_string(),
                    reason,
                },
                other => other,
            })?;

        if let Some(expected) = expected_checksum {
            checksum::verify_expected(&scratch, expected, url).await?;
        }

        let mut archive = PackArchive::open(&scratch)?;
        if archive.is_empty() {
            return Err(HubError::EmptyArchive);
        }

        let pack_name = derive_pack_name(url);
        let target_dir = self.pack_root.join(&pack_name);

        // Extract into a sibling staging dir, then swap it into place so the
        // target is either fully populated or fully absent.
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&self.pack_root)?;
        archive.extract_to(staging.path())?;

        if tokio::fs::try_exists(&target_dir).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&target_dir).await?;
        }
        let staging_path = staging.keep();
        if let Err(e) = tokio::fs::rename(&staging_path, &target_dir).await {
            let _ = tokio::fs::remove_dir_all(&staging_path).await;
            return Err(e.into());
        }

        log::info!("installed pack {} at {}", pack_name, target_dir.display());
        self.cache.invalidate();
        Ok(())
    }

    /// Remove an installed pack.
    ///
    /// Candidate paths are tried in priority order: the explicitly supplied
    /// path, that path's basename re-joined under the pack root (so a caller
    /// passing a foreign absolute path cannot delete outside the managed
    /// tree by accident), then the path derived from the pack name.
    pub async fn remove(&self, name: &str, known_path: Option<&Path>) -> Result<()> {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(path) = known_path {
            candidates.push(path.to_path_buf());
            if let Some(base) = path.file_name() {
                candidates.push(self.pack_root.join(base));
            }
        }
        candidates.push(self.pack_root.join(name));

        for candidate in candidates {
            let metadata = match tokio::fs::metadata(&candidate).await {
                Ok(metadata) => metadata,
                Err(_) => continue,
            };
            if metadata.is_dir() {
                tokio::fs::remove_dir_all(&candidate).await?;
            } else {
                tokio::fs::remove_file(&candidate).await?;
            }
            log::info!("removed pack at {}", candidate.display());
            self.cache.invalidate();
            return Ok(());
        }

        Err(HubError::PackNotFound {
            name: name.to_string(),
        })
    }

    /// Enumerate installed packs with their manifests. A malformed manifest
    /// degrades that pack to its directory name.
    pub async fn list_packs(&self) -> Result<Vec<PackInfo>> {
        let mut entries = tokio::fs::read_dir(&self.pack_root).await?;
        let mut packs = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy().to_string();
            if dir_name.starts_with('.') {
                continue;
            }
            let pack_dir = entry.path();
            let manifest = PackManifest::load_or_default(&pack_dir).await;

            packs.push(PackInfo {
                name: manifest.name.unwrap_or_else(|| dir_name.clone()),
                summary: manifest.summary,
                version: manifest.version,
                technology: manifest.technology,
                license: manifest.license,
                path: pack_dir,
            });
        }

        packs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(packs)
    }

    pub fn pack_root(&self) -> &Path {
        &self.pack_root
    }
}

/// Derive a pack directory name from a URL's final path segment, stripping a
/// `.zip` suffix. Falls back to a timestamped name when nothing usable
/// remains.
pub fn derive_pack_name(url: &str) -> String {
    let segment = match url::Url::parse(url) {
        Ok(parsed) => basename(parsed.path()).to_string(),
        Err(_) => basename(url).to_string(),
    };

    let name = if segment.to_lowercase().ends_with(".zip") {
        segment[..segment.len() - 4].to_string()
    } else {
        segment
    };

    if name.is_empty() {
        format!("pack-{}", Utc::now().timestamp_millis())
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn installer_for(root: &Path) -> PackInstaller {
        let http = Arc::new(HttpClient::new().unwrap());
        let cache = Arc::new(MetadataCache::new(root));
        PackInstaller::new(http, root, cache)
    }

    #[test]
    fn test_derive_pack_name() {
        assert_eq!(derive_pack_name("https://x.test/dl/pack-a.zip"), "pack-a");
        assert_eq!(derive_pack_name("https://x.test/dl/Pack-B.ZIP"), "Pack-B");
        assert_eq!(derive_pack_name("https://x.test/dl/pack-c"), "pack-c");
        assert_eq!(
            derive_pack_name("https://x.test/a/b/pack-d.zip?token=y"),
            "pack-d"
        );
        assert!(derive_pack_name("https://x.test/").starts_with("pack-"));
    }

    #[tokio::test]
    async fn test_remove_by_name() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("demo/templates")).unwrap();

        let installer = installer_for(root.path());
        installer.remove("demo", None).await.unwrap();
        assert!(!root.path().join("demo").exists());
    }

    #[tokio::test]
    async fn test_remove_normalizes_foreign_path() {
        let root = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("demo")).unwrap();

        // The supplied path does not exist, but its basename under the pack
        // root does
        let foreign = outside.path().join("somewhere/else/demo");
        let installer = installer_for(root.path());
        installer.remove("ignored", Some(&foreign)).await.unwrap();
        assert!(!root.path().join("demo").exists());
    }

    #[tokio::test]
    async fn test_remove_missing_pack_reports_not_found() {
        let root = TempDir::new().unwrap();
        let installer = installer_for(root.path());

        let err = installer.remove("ghost", None).await.unwrap_err();
        assert!(matches!(err, HubError::PackNotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_packs_degrades_malformed_manifest() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("good")).unwrap();
        std::fs::write(
            root.path().join("good/metadata.yaml"),
            "name: Good Pack\nversion: 2.0.0\n",
        )
        .unwrap();
        std::fs::create_dir_all(root.path().join("broken")).unwrap();
        std::fs::write(root.path().join("broken/metadata.yaml"), "{{{ nope").unwrap();

        let installer = installer_for(root.path());
        let packs = installer.list_packs().await.unwrap();

        assert_eq!(packs.len(), 2);
        assert_eq!(packs[0].name, "Good Pack");
        assert_eq!(packs[0].version.as_deref(), Some("2.0.0"));
        assert_eq!(packs[1].name, "broken");
        assert!(packs[1].version.is_none());
    }
}
