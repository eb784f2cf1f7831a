//! Operation surface consumed by UI/IPC layers.
//!
//! Every operation returns a success/failure envelope instead of raising;
//! callers branch on `ok`. Cancellation surfaces as the exact error string
//! `"cancelled"` so interactive callers can suppress error messaging for
//! user-initiated aborts.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::applier::{ConflictResolver, TemplateApplier};
use crate::cache::MetadataCache;
use crate::descriptor::ContentDescriptor;
use crate::http::HttpClient;
use crate::installer::{PackInfo, PackInstaller};
use crate::template::{normalize, TemplateSpec};
use crate::Result;

/// Success/failure envelope: `{ok: true, data}` or `{ok: false, error}`.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Outcome<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(err.to_string()),
        }
    }

    /// Whether this envelope carries the user-cancellation error.
    pub fn is_cancelled(&self) -> bool {
        self.error.as_deref() == Some("cancelled")
    }
}

/// Facade wiring the cache, applier and installer behind the envelope
/// contract.
pub struct Ops {
    cache: Arc<MetadataCache>,
    applier: TemplateApplier,
    installer: PackInstaller,
}

impl Ops {
    pub fn new(http: Arc<HttpClient>, pack_root: impl Into<PathBuf>) -> Self {
        let pack_root = pack_root.into();
        let cache = Arc::new(MetadataCache::new(&pack_root));
        let applier = TemplateApplier::new(&pack_root);
        let installer = PackInstaller::new(http, &pack_root, cache.clone());
        Self {
            cache,
            applier,
            installer,
        }
    }

    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    pub async fn list_templates(&self, source: &str) -> Outcome<Vec<ContentDescriptor>> {
        Outcome::from_result(
            self.cache
                .list_templates(source)
                .await
                .map(|snapshot| snapshot.templates.clone()),
        )
    }

    pub async fn list_libraries(&self) -> Outcome<Vec<ContentDescriptor>> {
        Outcome::from_result(
            self.cache
                .list_libraries()
                .await
                .map(|snapshot| snapshot.libraries.clone()),
        )
    }

    pub async fn list_template_folders(&self) -> Outcome<Vec<String>> {
        Outcome::from_result(self.cache.list_categories().await)
    }

    pub async fn list_packs(&self) -> Outcome<Vec<PackInfo>> {
        Outcome::from_result(self.installer.list_packs().await)
    }

    /// Normalize the given specs and apply them to `destination` in order.
    /// Specs with unrecognized shapes are skipped, matching the lenient
    /// manifest handling elsewhere.
    pub async fn apply_templates(
        &self,
        destination: &Path,
        specs: Vec<TemplateSpec>,
        resolver: &dyn ConflictResolver,
    ) -> Outcome<()> {
        let templates: Vec<_> = specs.into_iter().filter_map(normalize).collect();
        Outcome::from_result(self.applier.apply(destination, &templates, resolver).await)
    }

    pub async fn install_pack(&self, url: &str, checksum: Option<&str>) -> Outcome<()> {
        Outcome::from_result(self.installer.install(url, checksum).await)
    }

    pub async fn remove_pack(&self, name: &str, path: Option<&Path>) -> Outcome<()> {
        Outcome::from_result(self.installer.remove(name, path).await)
    }

    pub fn clear_cache(&self) -> Outcome<()> {
        self.cache.invalidate();
        Outcome::success(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applier::OverwriteAll;
    use crate::HubError;
    use tempfile::TempDir;

    fn ops_for(root: &Path) -> Ops {
        let http = Arc::new(HttpClient::new().unwrap());
        Ops::new(http, root)
    }

    #[tokio::test]
    async fn test_cancelled_maps_to_exact_error_string() {
        let err: Result<()> = Err(HubError::Cancelled);
        let outcome = Outcome::from_result(err);
        assert!(!outcome.ok);
        assert_eq!(outcome.error.as_deref(), Some("cancelled"));
        assert!(outcome.is_cancelled());
    }

    #[tokio::test]
    async fn test_envelope_serialization() {
        let ok = Outcome::success(vec!["a".to_string()]);
        let raw = serde_json::to_string(&ok).unwrap();
        assert_eq!(raw, r#"{"ok":true,"data":["a"]}"#);

        let failed: Outcome<()> = Outcome::failure("boom");
        let raw = serde_json::to_string(&failed).unwrap();
        assert_eq!(raw, r#"{"ok":false,"error":"boom"}"#);
    }

    #[tokio::test]
    async fn test_list_templates_envelope() {
        let root = TempDir::new().unwrap();
        let template_dir = root.path().join("demo/templates/react-app");
        std::fs::create_dir_all(&template_dir).unwrap();
        std::fs::write(template_dir.join("index.ts"), "x").unwrap();

        let ops = ops_for(root.path());
        let outcome = ops.list_templates("test").await;
        assert!(outcome.ok);
        assert_eq!(outcome.data.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_skips_unrecognized_specs() {
        let root = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let ops = ops_for(root.path());

        let mut workspace = TemplateSpec {
            name: "ws".to_string(),
            ..TemplateSpec::default()
        };
        workspace.category = Some("workspace".to_string());
        workspace.folders = Some(vec!["src".to_string()]);
        let unknown = TemplateSpec {
            name: "mystery".to_string(),
            ..TemplateSpec::default()
        };

        let outcome = ops
            .apply_templates(dest.path(), vec![workspace, unknown], &OverwriteAll)
            .await;
        assert!(outcome.ok);
        assert!(dest.path().join("src").is_dir());
    }

    #[tokio::test]
    async fn test_remove_missing_pack_is_envelope_failure() {
        let root = TempDir::new().unwrap();
        let ops = ops_for(root.path());

        let outcome = ops.remove_pack("ghost", None).await;
        assert!(!outcome.ok);
        assert!(outcome.error.unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn test_clear_cache_always_succeeds() {
        let root = TempDir::new().unwrap();
        let ops = ops_for(root.path());
        assert!(ops.clear_cache().ok);
    }
}
