//! Remote marketplace manifests.
//!
//! A marketplace is either a directly fetchable JSON manifest listing
//! installable packs, or a GitHub release carrying that manifest as an
//! asset. Release page URLs are normalized to the GitHub API endpoint, the
//! manifest asset is read from the release, and each entry's `zip` name is
//! resolved to the matching asset's download URL. Entries without a zip
//! archive are silently skipped.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::http::HttpClient;
use crate::{HubError, Result};

pub const OFFICIAL_MARKETPLACE_URL: &str =
    "https://github.com/cbabil/projecthub-packs/releases/latest";

/// Release asset holding the pack manifest.
pub const MANIFEST_ASSET: &str = "packs-manifest.json";

/// One installable pack advertised by a marketplace manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePack {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub technology: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    /// Archive URL, or the release asset name before resolution. Resolved
    /// entries always end in `.zip`.
    pub zip: String,
    #[serde(default)]
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteManifest {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub packs: Vec<RemotePack>,
}

/// One downloadable file attached to a GitHub release.
#[derive(Debug, Clone, Deserialize)]
struct ReleaseAsset {
    name: String,
    browser_download_url: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Release {
    #[serde(default)]
    tag_name: Option<String>,
    #[serde(default)]
    assets: Vec<ReleaseAsset>,
}

/// Fetch a marketplace manifest and keep only its installable entries.
///
/// A URL ending in `.json` is fetched as the manifest itself. Anything else
/// is treated as a release: GitHub release page URLs are rewritten to the
/// API endpoint, the `packs-manifest.json` asset is read, and each entry's
/// `zip` asset name is resolved to that asset's download URL. Entries with
/// no matching zip asset are skipped.
pub async fn fetch_manifest(http: &Arc<HttpClient>, url: &str) -> Result<Vec<RemotePack>> {
    if url.to_lowercase().ends_with(".json") {
        let manifest: RemoteManifest = http.get_json(url).await.map_err(HubError::from)?;
        return Ok(filter_archive_entries(manifest.packs, url));
    }

    let api_url = release_api_url(url).unwrap_or_else(|| url.to_string());
    let release: Release = http.get_json(&api_url).await.map_err(HubError::from)?;

    let manifest_asset = release
        .assets
        .iter()
        .find(|asset| asset.name == MANIFEST_ASSET)
        .ok_or_else(|| HubError::InvalidManifest {
            message: format!("{} not found in release at {}", MANIFEST_ASSET, url),
        })?;
    let manifest: RemoteManifest = http
        .get_json(&manifest_asset.browser_download_url)
        .await
        .map_err(HubError::from)?;

    let total = manifest.packs.len();
    let mut packs = Vec::new();
    for mut pack in manifest.packs {
        let Some(asset) = release.assets.iter().find(|a| a.name == pack.zip) else {
            continue;
        };
        if !is_archive_url(&asset.browser_download_url) {
            continue;
        }
        pack.zip = asset.browser_download_url.clone();
        if pack.version.is_none() {
            pack.version = release.tag_name.clone().or_else(|| manifest.version.clone());
        }
        packs.push(pack);
    }
    if packs.len() < total {
        log::debug!(
            "skipped {} entries without a zip asset from {}",
            total - packs.len(),
            url
        );
    }

    Ok(packs)
}

fn filter_archive_entries(packs: Vec<RemotePack>, url: &str) -> Vec<RemotePack> {
    let total = packs.len();
    let packs: Vec<RemotePack> = packs
        .into_iter()
        .filter(|pack| is_archive_url(&pack.zip))
        .collect();
    if packs.len() < total {
        log::debug!(
            "skipped {} non-archive entries from {}",
            total - packs.len(),
            url
        );
    }
    packs
}

/// Rewrite a GitHub release page URL to the corresponding API endpoint.
/// `releases/latest` (or a bare repository URL) maps to the latest-release
/// endpoint, `releases/tag/<tag>` to the tagged one. API URLs and
/// non-GitHub URLs return `None` and are fetched as given.
fn release_api_url(url: &str) -> Option<String> {
    if url.contains("api.github.com") {
        return None;
    }
    let rest = url.split("github.com/").nth(1)?;
    let mut parts = rest.trim_end_matches('/').split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    match (parts.next(), parts.next(), parts.next()) {
        (Some("releases"), Some("tag"), Some(tag)) => Some(format!(
            "https://api.github.com/repos/{}/{}/releases/tags/{}",
            owner, repo, tag
        )),
        (Some("releases"), Some("latest"), None)
        | (Some("releases"), None, None)
        | (None, None, None) => Some(format!(
            "https://api.github.com/repos/{}/{}/releases/latest",
            owner, repo
        )),
        _ => None,
    }
}

fn is_archive_url(url: &str) -> bool {
    url.to_lowercase().ends_with(".zip")
}

/// Resolve marketplace input to a full URL. Supports `owner/repo` shorthand
/// (mapped to the repository's latest GitHub release), plus full http(s) and
/// file URLs passed through unchanged.
pub fn resolve_marketplace_url(input: &str) -> Result<String> {
    let trimmed = input.trim();

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") || trimmed.starts_with("file://") {
        return Ok(trimmed.to_string());
    }

    let mut parts = trimmed.split('/');
    if let (Some(owner), Some(repo), None) = (parts.next(), parts.next(), parts.next()) {
        if !owner.is_empty() && !repo.is_empty() {
            return Ok(format!(
                "https://github.com/{}/{}/releases/latest",
                owner, repo
            ));
        }
    }

    Err(HubError::InvalidManifest {
        message: format!(
            "Invalid marketplace URL: \"{}\". Use owner/repo or full URL.",
            input
        ),
    })
}

/// Stable identifier derived from a marketplace URL.
pub fn derive_marketplace_id(url: &str) -> String {
    if let Some((owner, repo)) = github_owner_repo(url) {
        return format!("{}-{}", owner, repo).to_lowercase();
    }
    let hash = url
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_add(u32::from(b)));
    format!("custom-{}", hash)
}

/// Display name derived from a marketplace URL.
pub fn derive_marketplace_name(url: &str) -> String {
    if let Some((owner, repo)) = github_owner_repo(url) {
        return format!("{}/{}", owner, repo);
    }
    if url.ends_with(".json") {
        if let Some(file) = url.rsplit('/').next() {
            let stem = file.trim_end_matches(".json");
            if !stem.is_empty() {
                return stem.to_string();
            }
        }
    }
    "Custom".to_string()
}

fn github_owner_repo(url: &str) -> Option<(&str, &str)> {
    let rest = url.split("github.com/").nth(1)?;
    let mut parts = rest.split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    Some((owner, repo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_shorthand() {
        assert_eq!(
            resolve_marketplace_url("cbabil/projecthub-packs").unwrap(),
            "https://github.com/cbabil/projecthub-packs/releases/latest"
        );
    }

    #[test]
    fn test_resolve_passes_through_urls() {
        for url in [
            "https://example.test/packs.json",
            "http://example.test/packs.json",
            "file:///tmp/packs.json",
        ] {
            assert_eq!(resolve_marketplace_url(url).unwrap(), url);
        }
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        assert!(resolve_marketplace_url("not a url").is_err());
        assert!(resolve_marketplace_url("owner/repo/extra").is_err());
        assert!(resolve_marketplace_url("/repo").is_err());
    }

    #[test]
    fn test_derive_id_and_name_github() {
        let url = "https://github.com/Acme/Packs/releases/latest";
        assert_eq!(derive_marketplace_id(url), "acme-packs");
        assert_eq!(derive_marketplace_name(url), "Acme/Packs");
    }

    #[test]
    fn test_derive_name_manifest_url() {
        assert_eq!(
            derive_marketplace_name("https://example.test/official.json"),
            "official"
        );
        assert_eq!(derive_marketplace_name("https://example.test/x"), "Custom");
    }

    #[test]
    fn test_release_api_url_rewrites_release_pages() {
        assert_eq!(
            release_api_url("https://github.com/cbabil/projecthub-packs/releases/latest").unwrap(),
            "https://api.github.com/repos/cbabil/projecthub-packs/releases/latest"
        );
        assert_eq!(
            release_api_url("https://github.com/acme/packs/releases/tag/v1.2.0").unwrap(),
            "https://api.github.com/repos/acme/packs/releases/tags/v1.2.0"
        );
        assert_eq!(
            release_api_url("https://github.com/acme/packs").unwrap(),
            "https://api.github.com/repos/acme/packs/releases/latest"
        );
        // API endpoints and foreign hosts are fetched as given
        assert!(release_api_url("https://api.github.com/repos/a/b/releases/latest").is_none());
        assert!(release_api_url("https://example.test/release").is_none());
    }

    #[test]
    fn test_manifest_filters_non_archive_entries() {
        let raw = r#"{
            "version": "1.0.0",
            "packs": [
                {"name": "a", "zip": "https://x.test/a.zip", "checksum": "sha256:00"},
                {"name": "b", "zip": "https://x.test/b.tar.gz"},
                {"name": "c", "zip": "https://x.test/c.ZIP"}
            ]
        }"#;
        let manifest: RemoteManifest = serde_json::from_str(raw).unwrap();
        let packs: Vec<_> = manifest
            .packs
            .into_iter()
            .filter(|p| is_archive_url(&p.zip))
            .collect();
        let names: Vec<_> = packs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
