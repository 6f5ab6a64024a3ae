//! Enumerator - runs one enumeration job per dedicated worker thread.

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tokio::sync::oneshot;

use crate::cancel::CancellationToken;
use crate::catalog::{fetch_albums, fetch_artist_tracks, fetch_artists, fetch_tracks, MediaCatalog};
use crate::config::{BrowseConfig, SupportedExtensions};
use crate::error::{BrowseError, Result};
use crate::job::{JobHandle, JobMessage, JobOutcome, JobReceiver};
use crate::path::{album_root_path, artist_root_path, trim_trailing_separator, BrowsePath};
use crate::sections::compute_sections;
use crate::session::Session;
use crate::storage::{discover_storage_roots, StoragePlatform};
use crate::types::{Entry, EntryKind, Listing};
use crate::walk::WalkData;

/// One enumeration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationRequest {
    /// Caller-assigned, monotonic per caller.
    pub version: u64,
    /// Encoded path in the unified namespace; empty for the root listing.
    pub path: String,
    /// Descend into subdirectories of a filesystem path.
    pub recursive: bool,
}

impl EnumerationRequest {
    pub fn new(version: u64, path: impl Into<String>) -> Self {
        Self {
            version,
            path: path.into(),
            recursive: false,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

/// Read-only state shared by every job.
struct EnumeratorShared {
    config: BrowseConfig,
    extensions: SupportedExtensions,
    catalog: Arc<dyn MediaCatalog>,
    platform: Arc<dyn StoragePlatform>,
    session: Arc<Session>,
}

/// Starts enumeration jobs.
///
/// Submitting never cancels earlier jobs; callers that supersede a request
/// cancel its [`JobHandle`] themselves.
#[derive(Clone)]
pub struct Enumerator {
    shared: Arc<EnumeratorShared>,
}

impl std::fmt::Debug for Enumerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enumerator")
            .field("config", &self.shared.config)
            .field("session", &self.shared.session)
            .finish()
    }
}

impl Enumerator {
    pub fn new(
        config: BrowseConfig,
        catalog: Arc<dyn MediaCatalog>,
        platform: Arc<dyn StoragePlatform>,
        session: Arc<Session>,
    ) -> Self {
        let extensions = config.extension_set();
        Self {
            shared: Arc::new(EnumeratorShared {
                config,
                extensions,
                catalog,
                platform,
                session,
            }),
        }
    }

    pub fn config(&self) -> &BrowseConfig {
        &self.shared.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.shared.session
    }

    /// Starts `request` on its own worker thread.
    ///
    /// The worker sends exactly one [`JobMessage`] on the returned receiver.
    pub fn submit(&self, request: EnumerationRequest) -> Result<(JobHandle, JobReceiver)> {
        let (sender, receiver) = oneshot::channel();
        let handle = JobHandle::new(request.version, &request.path);
        let worker_handle = handle.clone();
        let shared = self.shared.clone();

        thread::Builder::new()
            .name("file-fetcher".to_string())
            .spawn(move || {
                worker_handle.token().bind_worker(thread::current());
                let message = shared.run_job(&worker_handle, request);
                if sender.send(message).is_err() {
                    log::debug!(
                        "enumeration receiver dropped version={}",
                        worker_handle.version()
                    );
                }
            })
            .map_err(BrowseError::Spawn)?;

        Ok((handle, receiver))
    }

    /// Runs an enumeration on the calling thread.
    ///
    /// Returns `Ok(None)` if `token` was cancelled.
    pub fn enumerate_blocking(
        &self,
        path: &str,
        recursive: bool,
        token: &CancellationToken,
    ) -> Result<Option<Listing>> {
        self.shared.enumerate(path, recursive, token)
    }
}

impl EnumeratorShared {
    fn run_job(&self, handle: &JobHandle, request: EnumerationRequest) -> JobMessage {
        let started = Instant::now();
        if !handle.start() {
            log::debug!("enumeration cancelled before start version={}", request.version);
            return JobMessage {
                version: request.version,
                path: request.path,
                outcome: JobOutcome::Cancelled,
            };
        }
        log::debug!(
            "enumeration started version={} path={:?} recursive={}",
            request.version,
            request.path,
            request.recursive
        );

        // Catch panics so the caller always hears back from the worker.
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.enumerate(&request.path, request.recursive, handle.token())
        }));

        let outcome = match result {
            _ if !self.session.is_alive() => JobOutcome::Cancelled,
            Ok(Ok(Some(listing))) => JobOutcome::Completed(listing),
            Ok(Ok(None)) => JobOutcome::Cancelled,
            Ok(Err(error)) => JobOutcome::Failed {
                error,
                partial: Listing::default(),
            },
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "enumeration worker panicked".to_string()
                };
                JobOutcome::Failed {
                    error: BrowseError::Internal(format!("panic during enumeration: {panic_msg}")),
                    partial: Listing::default(),
                }
            }
        };

        // A concurrent cancel wins over whatever was computed.
        let outcome = handle.finish(outcome);
        match &outcome {
            JobOutcome::Completed(listing) => log::info!(
                "enumeration finished version={} entries={} elapsed_ms={}",
                request.version,
                listing.len(),
                started.elapsed().as_millis()
            ),
            JobOutcome::Failed { error, .. } => log::warn!(
                "enumeration failed version={} path={:?} error={}",
                request.version,
                request.path,
                error
            ),
            JobOutcome::Cancelled => log::debug!(
                "enumeration cancelled version={} elapsed_ms={}",
                request.version,
                started.elapsed().as_millis()
            ),
        }

        JobMessage {
            version: request.version,
            path: request.path,
            outcome,
        }
    }

    fn enumerate(
        &self,
        path: &str,
        recursive: bool,
        token: &CancellationToken,
    ) -> Result<Option<Listing>> {
        let labels = &self.config.labels;
        let catalog = self.catalog.as_ref();
        let listing = match BrowsePath::parse(path)? {
            BrowsePath::Root => {
                let platform = self.platform.as_ref();
                let Some(mut entries) = discover_storage_roots(platform, labels, token) else {
                    return Ok(None);
                };
                self.append_root_extras(&mut entries);
                Listing::new(entries)
            }
            BrowsePath::ArtistRoot { .. } => match fetch_artists(catalog, labels, token)? {
                Some(entries) => self.sectioned(entries),
                None => return Ok(None),
            },
            BrowsePath::Artist { artist_id, .. } => {
                match fetch_artist_tracks(catalog, labels, artist_id, path, token)? {
                    Some(listing) => listing,
                    None => return Ok(None),
                }
            }
            BrowsePath::AlbumRoot { .. } => match fetch_albums(catalog, labels, None, token)? {
                Some(entries) => self.sectioned(entries),
                None => return Ok(None),
            },
            BrowsePath::AlbumTracks {
                artist_id,
                album_id,
                ..
            } => match fetch_tracks(catalog, album_id, artist_id, token)? {
                Some(entries) => Listing::new(entries),
                None => return Ok(None),
            },
            BrowsePath::Filesystem(raw) => {
                let root = Path::new(trim_trailing_separator(raw));
                let mut walk_data =
                    WalkData::new(&self.extensions, token).with_recursion(recursive);
                let Some(entries) = walk_data.walk_it(root)? else {
                    return Ok(None);
                };
                if walk_data.skipped_dirs > 0 {
                    log::debug!(
                        "enumeration skipped unreadable subdirectories path={} count={}",
                        root.display(),
                        walk_data.skipped_dirs
                    );
                }
                self.sectioned(entries)
            }
        };
        Ok(Some(listing))
    }

    fn sectioned(&self, entries: Vec<Entry>) -> Listing {
        let sections = compute_sections(&entries, &self.config.labels.unknown_artist);
        let mut listing = Listing::new(entries);
        listing.sections = sections;
        listing
    }

    /// Favorites and catalog shortcuts follow the storage volumes.
    fn append_root_extras(&self, entries: &mut Vec<Entry>) {
        let labels = &self.config.labels;
        for favorite in &self.config.favorites {
            if !self.platform.is_dir(favorite) {
                continue;
            }
            let name = favorite
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| favorite.to_string_lossy().into_owned());
            entries.push(Entry::new(
                favorite.to_string_lossy(),
                name,
                EntryKind::Favorite,
            ));
        }
        if self.config.catalog_shortcuts {
            entries.push(Entry::new(
                artist_root_path(&labels.artists),
                labels.artists.clone(),
                EntryKind::ArtistRoot,
            ));
            entries.push(Entry::new(
                album_root_path(&labels.albums),
                labels.albums.clone(),
                EntryKind::AlbumRoot,
            ));
        }
    }
}
