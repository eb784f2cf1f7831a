//! Path helpers shared by the cache, applier and installer.

use std::path::{Component, Path, PathBuf};

use crate::{HubError, Result};

/// Join `relative` under `root`, rejecting absolute paths and any `..`
/// component. Every pack-relative source path and destination-relative
/// target goes through this before any read or write.
pub fn resolve_in_root(root: &Path, relative: &Path) -> Result<PathBuf> {
    if relative.is_absolute() {
        return Err(HubError::PathEscapesRoot {
            path: relative.to_path_buf(),
            root: root.to_path_buf(),
        });
    }
    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => {
                return Err(HubError::PathEscapesRoot {
                    path: relative.to_path_buf(),
                    root: root.to_path_buf(),
                })
            }
        }
    }
    Ok(resolved)
}

/// Final path segment of a URL or path-like string.
pub fn basename(value: &str) -> &str {
    value
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(value)
}
