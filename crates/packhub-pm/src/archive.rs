//! Zip extraction for downloaded pack archives.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{HubError, Result};

/// A downloaded pack archive opened for inspection and extraction.
pub struct PackArchive {
    archive: zip::ZipArchive<BufReader<File>>,
}

impl PackArchive {
    /// Open a zip archive from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let archive = zip::ZipArchive::new(reader)
            .map_err(|e| HubError::ExtractionFailed(format!("Failed to open zip: {}", e)))?;
        Ok(Self { archive })
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// Entry names, in archive order.
    pub fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(String::from).collect()
    }

    /// Extract all entries into `dest_dir`, preserving the archive's
    /// internal structure. Entries that would escape `dest_dir` are an error.
    pub fn extract_to(&mut self, dest_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dest_dir)?;
        let dest_canonical = dest_dir.canonicalize().map_err(|e| {
            HubError::ExtractionFailed(format!("Failed to canonicalize destination: {}", e))
        })?;

        for i in 0..self.archive.len() {
            let mut entry = self
                .archive
                .by_index(i)
                .map_err(|e| HubError::ExtractionFailed(format!("Failed to read zip entry: {}", e)))?;

            let name = entry.name().to_string();
            if name.is_empty() {
                continue;
            }
            if name.contains("..") {
                return Err(HubError::ExtractionFailed(format!(
                    "Path traversal detected in archive: {}",
                    name
                )));
            }

            let outpath = dest_dir.join(&name);

            if entry.is_dir() {
                std::fs::create_dir_all(&outpath)?;
            } else if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent)?;
            }

            // Directories exist now, so the parent can be canonicalized for the
            // escape check even before the file itself is written.
            let outpath_canonical = outpath.canonicalize().unwrap_or_else(|_| {
                if let Some(parent) = outpath.parent() {
                    if let Ok(parent_canonical) = parent.canonicalize() {
                        if let Some(filename) = outpath.file_name() {
                            return parent_canonical.join(filename);
                        }
                    }
                }
                outpath.clone()
            });

            if !outpath_canonical.starts_with(&dest_canonical) {
                return Err(HubError::ExtractionFailed(format!(
                    "Path traversal detected: {} escapes destination directory",
                    name
                )));
            }

            if !entry.is_dir() {
                let mut outfile = File::create(&outpath)?;
                std::io::copy(&mut entry, &mut outfile)?;

                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    if let Some(mode) = entry.unix_mode() {
                        std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
                    }
                }
            }
        }

        Ok(())
    }
}
