//! Derived-metadata cache over the pack tree.
//!
//! The first listing after an invalidation triggers a full scan; while that
//! scan is in flight every concurrent caller attaches to the same shared
//! computation and observes the identical snapshot. This is the single-flight
//! guarantee: at most one scan per cache kind, regardless of request volume.
//!
//! Invalidation during a pending scan follows policy (a): the in-flight scan
//! completes and its result is handed to the callers already attached, but a
//! generation check prevents it from being stored, so the next listing
//! re-scans.

mod scan;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::descriptor::{ContentDescriptor, ContentKind};
use crate::{HubError, Result};

/// Immutable listing of templates plus the category set derived from it.
/// Categories live inside the snapshot so they are cached and invalidated in
/// lock-step with the templates they were derived from.
#[derive(Debug)]
pub struct TemplateSnapshot {
    pub templates: Vec<ContentDescriptor>,
    pub categories: Vec<String>,
}

/// Immutable listing of libraries.
#[derive(Debug)]
pub struct LibrarySnapshot {
    pub libraries: Vec<ContentDescriptor>,
}

type ScanResult<T> = std::result::Result<Arc<T>, Arc<HubError>>;
type SharedScan<T> = Shared<BoxFuture<'static, ScanResult<T>>>;

enum FlightState<T> {
    Empty,
    Pending {
        generation: u64,
        future: SharedScan<T>,
    },
    Ready(Arc<T>),
}

struct FlightCell<T> {
    state: Mutex<FlightState<T>>,
}

impl<T> FlightCell<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(FlightState::Empty),
        }
    }

    fn reset(&self) {
        *self.state.lock().expect("cache lock poisoned") = FlightState::Empty;
    }
}

pub struct MetadataCache {
    pack_root: PathBuf,
    templates: FlightCell<TemplateSnapshot>,
    libraries: FlightCell<LibrarySnapshot>,
    /// Bumped on every invalidation; a completed scan is only stored when the
    /// generation it started under is still current.
    generation: AtomicU64,
    scans_started: AtomicU64,
}

impl MetadataCache {
    pub fn new(pack_root: impl Into<PathBuf>) -> Self {
        Self {
            pack_root: pack_root.into(),
            templates: FlightCell::new(),
            libraries: FlightCell::new(),
            generation: AtomicU64::new(0),
            scans_started: AtomicU64::new(0),
        }
    }

    pub fn pack_root(&self) -> &Path {
        &self.pack_root
    }

    /// Template listing, scanning the pack tree on first use.
    pub async fn list_templates(&self, source: &str) -> Result<Arc<TemplateSnapshot>> {
        let root = self.pack_root.clone();
        let snapshot = self
            .get_or_scan(&self.templates, move || {
                async move {
                    let templates = scan::scan_descriptors(&root, ContentKind::Template).await?;
                    let categories = scan::collect_categories(&templates);
                    Ok(TemplateSnapshot {
                        templates,
                        categories,
                    })
                }
                .boxed()
            })
            .await?;
        log::debug!(
            "cache read: {} templates (source: {})",
            snapshot.templates.len(),
            source
        );
        Ok(snapshot)
    }

    /// Library listing, scanning the pack tree on first use.
    pub async fn list_libraries(&self) -> Result<Arc<LibrarySnapshot>> {
        let root = self.pack_root.clone();
        self.get_or_scan(&self.libraries, move || {
            async move {
                let libraries = scan::scan_descriptors(&root, ContentKind::Library).await?;
                Ok(LibrarySnapshot { libraries })
            }
            .boxed()
        })
        .await
    }

    /// Categories derived from the template snapshot (never scanned
    /// independently).
    pub async fn list_categories(&self) -> Result<Vec<String>> {
        Ok(self.list_templates("list_categories").await?.categories.clone())
    }

    /// Drop all memoized snapshots. Cheap and idempotent; repeated calls
    /// before the next read still cause exactly one new scan.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.templates.reset();
        self.libraries.reset();
        log::debug!("cache cleared");
    }

    /// Number of scans started since construction. Diagnostic only.
    pub fn scan_count(&self) -> u64 {
        self.scans_started.load(Ordering::SeqCst)
    }

    /// The single-flight state machine. Only the Empty -> Pending transition
    /// starts a scan; everyone else attaches to the pending computation or
    /// reads the ready snapshot. The lock is never held across an await.
    async fn get_or_scan<T, F>(&self, cell: &FlightCell<T>, start: F) -> Result<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> BoxFuture<'static, Result<T>>,
    {
        let (future, started_generation) = {
            let mut state = cell.state.lock().expect("cache lock poisoned");
            match &*state {
                FlightState::Ready(value) => return Ok(value.clone()),
                FlightState::Pending { generation, future } => (future.clone(), *generation),
                FlightState::Empty => {
                    let generation = self.generation.load(Ordering::SeqCst);
                    self.scans_started.fetch_add(1, Ordering::SeqCst);
                    let scan = start();
                    let future: SharedScan<T> = async move {
                        scan.await.map(Arc::new).map_err(Arc::new)
                    }
                    .boxed()
                    .shared();
                    *state = FlightState::Pending {
                        generation,
                        future: future.clone(),
                    };
                    (future, generation)
                }
            }
        };

        let result = future.await;

        let mut state = cell.state.lock().expect("cache lock poisoned");
        let still_current = matches!(
            &*state,
            FlightState::Pending { generation, .. } if *generation == started_generation
        );
        match result {
            Ok(snapshot) => {
                if still_current {
                    *state = FlightState::Ready(snapshot.clone());
                }
                // A stale snapshot (invalidated mid-scan) is still returned to
                // the callers that were attached, just never stored.
                Ok(snapshot)
            }
            Err(err) => {
                // Failures are never memoized; the next call retries the scan.
                if still_current {
                    *state = FlightState::Empty;
                }
                Err(HubError::ScanFailed(err.to_string()))
            }
        }
    }
}
