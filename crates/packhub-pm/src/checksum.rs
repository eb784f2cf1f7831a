//! Checksum verification for downloaded pack archives.

use md5::Md5;
use sha2::{Digest, Sha256, Sha512};
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::{HubError, Result};

/// Supported checksum types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumType {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl ChecksumType {
    /// Detect checksum type from length of hex string
    pub fn from_hex_length(len: usize) -> Option<Self> {
        match len {
            32 => Some(ChecksumType::Md5),
            40 => Some(ChecksumType::Sha1),
            64 => Some(ChecksumType::Sha256),
            128 => Some(ChecksumType::Sha512),
            _ => None,
        }
    }

    /// Detect checksum type from an algorithm tag (e.g. the `sha256` in
    /// `sha256:<hex>`)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "md5" => Some(ChecksumType::Md5),
            "sha1" => Some(ChecksumType::Sha1),
            "sha256" => Some(ChecksumType::Sha256),
            "sha512" => Some(ChecksumType::Sha512),
            _ => None,
        }
    }
}

/// Parse an expected checksum string into its type and bare hex digest.
/// Accepts an optional `algo:` prefix; bare digests are classified by length.
pub fn parse_expected(expected: &str) -> Result<(ChecksumType, String)> {
    let trimmed = expected.trim();
    let (kind, digest) = match trimmed.split_once(':') {
        Some((tag, rest)) => {
            let kind = ChecksumType::from_tag(tag)
                .ok_or_else(|| HubError::InvalidChecksum(expected.to_string()))?;
            (kind, rest)
        }
        None => {
            let kind = ChecksumType::from_hex_length(trimmed.len())
                .ok_or_else(|| HubError::InvalidChecksum(expected.to_string()))?;
            (kind, trimmed)
        }
    };

    if digest.is_empty() || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(HubError::InvalidChecksum(expected.to_string()));
    }

    Ok((kind, digest.to_lowercase()))
}

/// Verify checksum of a file against a bare hex digest
pub async fn verify_checksum(
    path: &Path,
    expected: &str,
    checksum_type: ChecksumType,
) -> Result<bool> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer).await?;

    let actual = match checksum_type {
        ChecksumType::Md5 => {
            let mut hasher = Md5::new();
            hasher.update(&buffer);
            format!("{:x}", hasher.finalize())
        }
        ChecksumType::Sha1 => {
            use sha1::{Digest as Sha1Digest, Sha1};
            let mut hasher = Sha1::new();
            hasher.update(&buffer);
            format!("{:x}", hasher.finalize())
        }
        ChecksumType::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(&buffer);
            format!("{:x}", hasher.finalize())
        }
        ChecksumType::Sha512 => {
            let mut hasher = Sha512::new();
            hasher.update(&buffer);
            format!("{:x}", hasher.finalize())
        }
    };

    Ok(actual.eq_ignore_ascii_case(expected))
}

/// Verify a file against a raw expected string (optionally `algo:`-prefixed),
/// failing with a checksum-mismatch error on difference.
pub async fn verify_expected(path: &Path, expected: &str, source_name: &str) -> Result<()> {
    let (kind, digest) = parse_expected(expected)?;
    if verify_checksum(path, &digest, kind).await? {
        Ok(())
    } else {
        Err(HubError::ChecksumMismatch {
            source_name: source_name.to_string(),
        })
    }
}

/// Compute SHA-256 checksum of a file
pub async fn compute_sha256(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer).await?;

    let mut hasher = Sha256::new();
    hasher.update(&buffer);
    Ok(format!("{:x}", hasher.finalize()))
}
