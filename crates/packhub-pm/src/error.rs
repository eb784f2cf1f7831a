use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    // Manifest/parsing errors
    #[error("Failed to parse manifest: {0}")]
    ManifestParse(#[from] serde_yaml::Error),

    #[error("Invalid manifest: {message}")]
    InvalidManifest { message: String },

    // Network errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Download failed for {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Too many redirects for {url}")]
    TooManyRedirects { url: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Checksum errors
    #[error("Checksum mismatch for {source_name}")]
    ChecksumMismatch { source_name: String },

    #[error("Invalid checksum value: {0}")]
    InvalidChecksum(String),

    // Archive errors
    #[error("Archive is empty")]
    EmptyArchive,

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    // Pack errors
    #[error("Pack folder not found on disk: {name}")]
    PackNotFound { name: String },

    #[error("Installation failed: {0}")]
    InstallationFailed(String),

    // Cache errors
    #[error("Pack scan failed: {0}")]
    ScanFailed(String),

    // Path errors
    #[error("Path {path} escapes {root}")]
    PathEscapesRoot { path: PathBuf, root: PathBuf },

    // User-initiated cancellation; callers suppress error UI for this one
    #[error("cancelled")]
    Cancelled,
}

impl HubError {
    /// Whether this failure was an intentional user cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HubError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, HubError>;
