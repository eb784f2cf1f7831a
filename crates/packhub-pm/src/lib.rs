pub mod applier;
pub mod archive;
pub mod cache;
pub mod checksum;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod http;
pub mod installer;
pub mod manifest;
pub mod marketplace;
pub mod ops;
pub mod paths;
pub mod project;
pub mod template;

pub use applier::{ConflictChoice, ConflictDecision, ConflictResolver, TemplateApplier};
pub use archive::PackArchive;
pub use cache::{LibrarySnapshot, MetadataCache, TemplateSnapshot};
pub use config::HubPaths;
pub use descriptor::{ContentDescriptor, ContentKind};
pub use error::{HubError, Result};
pub use http::{HttpClient, HttpClientConfig};
pub use installer::{PackInfo, PackInstaller};
pub use manifest::PackManifest;
pub use ops::{Ops, Outcome};
pub use template::{normalize, NormalizedTemplate, TemplateSpec};
