//! Template application engine.
//!
//! Materializes a destination project directory from an ordered list of
//! normalized templates. File-level conflicts are delegated to a
//! caller-supplied resolver whose decision can be made sticky ("apply to
//! all") for the remainder of one `apply` call. A cancel decision aborts the
//! whole operation with the dedicated cancelled error.
//!
//! Ordering is caller responsibility: templates are processed strictly in
//! input order and never reordered, so conflict prompts surface in a
//! predictable sequence.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::paths::resolve_in_root;
use crate::template::NormalizedTemplate;
use crate::{HubError, Result};

/// What to do about a single conflicting file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    Overwrite,
    Skip,
    Cancel,
}

/// A resolver's answer, optionally sticky for the rest of the operation.
#[derive(Debug, Clone, Copy)]
pub struct ConflictChoice {
    pub decision: ConflictDecision,
    pub apply_all: bool,
}

impl ConflictChoice {
    pub fn once(decision: ConflictDecision) -> Self {
        Self {
            decision,
            apply_all: false,
        }
    }

    pub fn sticky(decision: ConflictDecision) -> Self {
        Self {
            decision,
            apply_all: true,
        }
    }
}

/// Decides what happens when a file already exists at the destination.
#[async_trait]
pub trait ConflictResolver: Send + Sync {
    async fn resolve(&self, target: &Path) -> ConflictChoice;
}

/// Overwrite every conflicting file without asking.
pub struct OverwriteAll;

#[async_trait]
impl ConflictResolver for OverwriteAll {
    async fn resolve(&self, _target: &Path) -> ConflictChoice {
        ConflictChoice::sticky(ConflictDecision::Overwrite)
    }
}

/// Keep every existing file without asking.
pub struct SkipAll;

#[async_trait]
impl ConflictResolver for SkipAll {
    async fn resolve(&self, _target: &Path) -> ConflictChoice {
        ConflictChoice::sticky(ConflictDecision::Skip)
    }
}

/// Sticky decision cell, scoped to exactly one `apply` call and threaded by
/// mutable reference through the whole walk.
#[derive(Default)]
struct StickyDecision {
    decision: Option<ConflictDecision>,
}

pub struct TemplateApplier {
    pack_root: PathBuf,
}

impl TemplateApplier {
    pub fn new(pack_root: impl Into<PathBuf>) -> Self {
        Self {
            pack_root: pack_root.into(),
        }
    }

    /// Apply `templates` in order into `destination`.
    ///
    /// Returns `Err(HubError::Cancelled)` as soon as the resolver cancels;
    /// templates after the cancel point are not processed.
    pub async fn apply(
        &self,
        destination: &Path,
        templates: &[NormalizedTemplate],
        resolver: &dyn ConflictResolver,
    ) -> Result<()> {
        tokio::fs::create_dir_all(destination).await?;
        let mut sticky = StickyDecision::default();

        for template in templates {
            match template {
                NormalizedTemplate::Workspace { folders, .. } => {
                    for folder in folders {
                        let dir = resolve_in_root(destination, Path::new(folder))?;
                        tokio::fs::create_dir_all(&dir).await?;
                    }
                }
                NormalizedTemplate::Gitignore { filename, lines, .. }
                | NormalizedTemplate::Env { filename, lines, .. } => {
                    let target = resolve_in_root(destination, Path::new(filename))?;
                    if self.should_write(&target, resolver, &mut sticky).await? {
                        write_lines(&target, lines).await?;
                    }
                }
                NormalizedTemplate::Pack {
                    pack_path, files, ..
                } => {
                    let source_root = resolve_in_root(&self.pack_root, pack_path)?;
                    match files {
                        Some(files) => {
                            for (source, target) in files {
                                let source_path =
                                    resolve_in_root(&source_root, Path::new(source))?;
                                let dest_path =
                                    resolve_in_root(destination, Path::new(target))?;
                                if self.should_write(&dest_path, resolver, &mut sticky).await? {
                                    copy_file(&source_path, &dest_path).await?;
                                }
                            }
                        }
                        None => {
                            self.copy_directory(&source_root, destination, resolver, &mut sticky)
                                .await?;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Conflict-aware write gate: consults the sticky cell first, then the
    /// resolver. A missing target never prompts.
    async fn should_write(
        &self,
        target: &Path,
        resolver: &dyn ConflictResolver,
        sticky: &mut StickyDecision,
    ) -> Result<bool> {
        if !tokio::fs::try_exists(target).await.unwrap_or(false) {
            return Ok(true);
        }

        let decision = match sticky.decision {
            Some(decision) => decision,
            None => {
                let choice = resolver.resolve(target).await;
                if choice.apply_all {
                    sticky.decision = Some(choice.decision);
                }
                choice.decision
            }
        };

        match decision {
            ConflictDecision::Overwrite => Ok(true),
            ConflictDecision::Skip => Ok(false),
            ConflictDecision::Cancel => Err(HubError::Cancelled),
        }
    }

    /// Recursively copy `source_root` into `destination_root`, re-checking
    /// for conflicts at every file. Iterative walk so the async conflict
    /// prompt needs no boxed recursion.
    async fn copy_directory(
        &self,
        source_root: &Path,
        destination_root: &Path,
        resolver: &dyn ConflictResolver,
        sticky: &mut StickyDecision,
    ) -> Result<()> {
        let mut pending = std::collections::VecDeque::new();
        pending.push_back((source_root.to_path_buf(), destination_root.to_path_buf()));

        while let Some((source_dir, dest_dir)) = pending.pop_front() {
            tokio::fs::create_dir_all(&dest_dir).await?;
            let mut entries = tokio::fs::read_dir(&source_dir).await?;

            while let Some(entry) = entries.next_entry().await? {
                let source_path = entry.path();
                let dest_path = dest_dir.join(entry.file_name());
                let file_type = entry.file_type().await?;

                if file_type.is_dir() {
                    pending.push_back((source_path, dest_path));
                } else if file_type.is_file()
                    && self.should_write(&dest_path, resolver, sticky).await?
                {
                    copy_file(&source_path, &dest_path).await?;
                }
            }
        }

        Ok(())
    }
}

async fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(source, dest).await?;
    Ok(())
}

/// Write literal lines joined by `\n`, with a trailing newline when
/// non-empty. Nothing environment-dependent leaks into the output, so
/// re-applying with overwrite is byte-identical.
async fn write_lines(target: &Path, lines: &[String]) -> Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut content = lines.join("\n");
    if !lines.is_empty() {
        content.push('\n');
    }
    tokio::fs::write(target, content).await?;
    Ok(())
}
