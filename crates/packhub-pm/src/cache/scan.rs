//! Pack tree scanning: derives descriptors from the on-disk pack layout.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

use crate::descriptor::{ContentDescriptor, ContentKind};
use crate::manifest::{normalize_files, PackManifest, DEFAULT_CATEGORY};
use crate::Result;

/// Scan every pack under `pack_root` for entries of `kind`.
///
/// A failure to read the pack root fails the whole scan; anything narrower
/// (missing manifest, malformed manifest, unreadable entry) degrades that
/// single pack or entry and the scan continues.
pub(crate) async fn scan_descriptors(
    pack_root: &Path,
    kind: ContentKind,
) -> Result<Vec<ContentDescriptor>> {
    let mut packs = tokio::fs::read_dir(pack_root).await?;
    let mut descriptors = Vec::new();

    while let Some(pack_entry) = packs.next_entry().await? {
        if !pack_entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let pack_name = pack_entry.file_name().to_string_lossy().to_string();
        // Hidden directories are never packs; the installer stages extractions
        // in dot-prefixed temp dirs inside the pack root.
        if pack_name.starts_with('.') {
            continue;
        }
        let pack_dir = pack_entry.path();
        let manifest = PackManifest::load_or_default(&pack_dir).await;

        let content_root = pack_dir.join(kind.subdir());
        let mut entries = match tokio::fs::read_dir(&content_root).await {
            Ok(entries) => entries,
            // Pack without this content kind; nothing to derive
            Err(_) => continue,
        };

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let entry_name = entry.file_name().to_string_lossy().to_string();
            let entry_dir = entry.path();

            descriptors.push(
                build_descriptor(kind, &pack_name, &manifest, &entry_name, &entry_dir).await,
            );
        }
    }

    Ok(descriptors)
}

async fn build_descriptor(
    kind: ContentKind,
    pack_name: &str,
    manifest: &PackManifest,
    entry_name: &str,
    entry_dir: &Path,
) -> ContentDescriptor {
    let content_entry = manifest.entry_for(entry_name);

    let mut files = content_entry
        .and_then(|e| e.files.as_deref())
        .map(normalize_files)
        .unwrap_or_default();
    if files.is_empty() {
        files = discover_files(entry_dir);
    }

    let description = match manifest.summary.as_deref() {
        Some(summary) => format!("{} ({})", summary, entry_name),
        None => format!("{} from {}", entry_name, pack_name),
    };

    ContentDescriptor {
        kind,
        id: format!("{}-{}", pack_name, entry_name),
        name: entry_name.to_string(),
        description,
        version: manifest.version_or_default(),
        category: derive_category(manifest, content_entry, entry_name),
        editable: content_entry
            .and_then(|e| e.editable)
            .unwrap_or_else(|| manifest.editable_or_default()),
        last_modified: entry_modified(entry_dir).await,
        source_path: PathBuf::from(pack_name)
            .join(kind.subdir())
            .join(entry_name),
        files,
    }
}

/// Category heuristic: an explicit workspace declaration or a workspace-ish
/// name wins, configuration-ish names come next, then the manifest fallback
/// chain (entry category -> pack category -> default).
fn derive_category(
    manifest: &PackManifest,
    content_entry: Option<&crate::manifest::ContentEntry>,
    entry_name: &str,
) -> String {
    let lowered = entry_name.to_lowercase();
    let declared_workspace = content_entry
        .and_then(|e| e.kind.as_deref())
        .map(|k| k == "workspace")
        .unwrap_or(false);

    if declared_workspace || lowered.contains("workspace") {
        return "workspace".to_string();
    }
    if lowered.contains("gitignore") || lowered.contains("config") {
        return "configuration".to_string();
    }
    content_entry
        .and_then(|e| e.category.clone())
        .or_else(|| manifest.category.clone())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

/// Recursively discover files under `root`, mapping each relative path to its
/// basename target. Discovery failures leave this single entry with an empty
/// listing rather than failing the scan.
fn discover_files(root: &Path) -> IndexMap<String, String> {
    let mut files = IndexMap::new();
    for entry in walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let relative = match entry.path().strip_prefix(root) {
            Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
            Err(_) => continue,
        };
        let target = entry.file_name().to_string_lossy().to_string();
        files.insert(relative, target);
    }
    files
}

async fn entry_modified(path: &Path) -> DateTime<Utc> {
    match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
        Ok(modified) => modified.into(),
        Err(_) => Utc::now(),
    }
}

/// Unique categories in encounter order, derived from a template listing.
pub(crate) fn collect_categories(descriptors: &[ContentDescriptor]) -> Vec<String> {
    let mut categories = Vec::new();
    for descriptor in descriptors {
        if !categories.contains(&descriptor.category) {
            categories.push(descriptor.category.clone());
        }
    }
    categories
}
