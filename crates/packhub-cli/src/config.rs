//! Shared CLI configuration helpers.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use packhub_pm::{HttpClient, HubPaths, Ops};

/// Environment variable overriding the managed root directory.
pub const ROOT_ENV: &str = "PACKHUB_HOME";

/// Resolve the managed root: explicit flag, then `PACKHUB_HOME`, then the
/// default under the home directory.
pub fn hub_paths(root: Option<PathBuf>) -> Result<HubPaths> {
    if let Some(root) = root {
        return Ok(HubPaths::with_root(root));
    }
    if let Ok(root) = std::env::var(ROOT_ENV) {
        if !root.is_empty() {
            return Ok(HubPaths::with_root(root));
        }
    }
    HubPaths::from_home().context("Could not determine the home directory")
}

/// Build the operation facade over the resolved pack root.
pub fn build_ops(root: Option<PathBuf>) -> Result<(Ops, HubPaths)> {
    let paths = hub_paths(root)?;
    let http = Arc::new(HttpClient::new().context("Failed to create HTTP client")?);
    Ok((Ops::new(http, paths.packs_dir()), paths))
}
