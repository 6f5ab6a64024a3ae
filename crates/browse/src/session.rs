//! Session liveness and the per-caller browser context.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cancel::VersionTracker;
use crate::engine::{EnumerationRequest, Enumerator};
use crate::error::{BrowseError, Result};
use crate::job::{JobHandle, JobMessage, JobOutcome, JobReceiver};
use crate::types::Listing;

/// Whether the owner of a browsing session is still around.
///
/// Workers check this before delivering so that results never reach a
/// destroyed caller.
#[derive(Debug)]
pub struct Session {
    alive: AtomicBool,
}

impl Session {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            alive: AtomicBool::new(true),
        })
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Ends the session. Returns `true` the first time.
    pub fn end(&self) -> bool {
        self.alive.swap(false, Ordering::AcqRel)
    }
}

/// A result accepted for the caller.
#[derive(Debug)]
pub struct Delivery {
    pub version: u64,
    pub path: String,
    pub listing: Listing,
    /// Set when the job failed; `listing` then holds the partial result.
    pub error: Option<BrowseError>,
}

/// Caller-side context: at most one current job, superseded on each new
/// request.
#[derive(Debug)]
pub struct Browser {
    enumerator: Enumerator,
    current: Mutex<Option<JobHandle>>,
    versions: VersionTracker,
}

impl Browser {
    pub fn new(enumerator: Enumerator) -> Self {
        Self {
            enumerator,
            current: Mutex::new(None),
            versions: VersionTracker::new(),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        self.enumerator.session()
    }

    /// Cancels the current job and starts a new one for `path`.
    ///
    /// Returns `Ok(None)` once the session has ended.
    pub fn enumerate(
        &self,
        version: u64,
        path: impl Into<String>,
        recursive: bool,
    ) -> Result<Option<JobReceiver>> {
        if !self.session().is_alive() {
            return Ok(None);
        }
        let mut current = self.current.lock();
        if let Some(previous) = current.take() {
            previous.cancel();
        }
        let active = self.versions.activate_version(version);
        if active != version {
            log::warn!(
                "enumeration version older than active version={} active={}",
                version,
                active
            );
        }
        let request = EnumerationRequest::new(version, path).recursive(recursive);
        let (handle, receiver) = self.enumerator.submit(request)?;
        *current = Some(handle);
        Ok(Some(receiver))
    }

    /// Cancels the current job if it was started for `version`.
    pub fn cancel_enumeration(&self, version: u64) -> bool {
        let mut current = self.current.lock();
        match current.as_ref() {
            Some(handle) if handle.version() == version => {
                let cancelled = handle.cancel();
                *current = None;
                cancelled
            }
            _ => false,
        }
    }

    /// Cancels whatever job is current.
    pub fn cancel_all(&self) -> bool {
        self.current
            .lock()
            .take()
            .map(|handle| handle.cancel())
            .unwrap_or(false)
    }

    /// Ends the session and cancels the current job.
    pub fn destroy(&self) {
        if self.session().end() {
            log::debug!("browser session ended");
        }
        self.cancel_all();
    }

    /// Version of the current job, if any.
    pub fn current_version(&self) -> Option<u64> {
        self.current.lock().as_ref().map(JobHandle::version)
    }

    /// Filters a worker's message.
    ///
    /// Only the latest requested version is delivered, and only once. Stale,
    /// cancelled or post-destroy messages are dropped.
    pub fn accept(&self, message: JobMessage) -> Option<Delivery> {
        if !self.session().is_alive() || !self.versions.is_current(message.version) {
            log::debug!("stale enumeration result dropped version={}", message.version);
            return None;
        }
        let mut current = self.current.lock();
        if current.as_ref().map(JobHandle::version) != Some(message.version) {
            return None;
        }
        let (listing, error) = match message.outcome {
            JobOutcome::Cancelled => return None,
            JobOutcome::Completed(listing) => (listing, None),
            JobOutcome::Failed { error, partial } => (partial, Some(error)),
        };
        *current = None;
        Some(Delivery {
            version: message.version,
            path: message.path,
            listing,
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrowseConfig;
    use crate::path::{album_root_path, artist_root_path};
    use crate::testing::{FakeCatalog, FakePlatform};
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn browser() -> Browser {
        let catalog = FakeCatalog::default()
            .with_artist(1, Some("Abba"), 1, 1)
            .with_album(Some(1), 10, Some("Arrival"), 1);
        Browser::new(Enumerator::new(
            BrowseConfig::default(),
            Arc::new(catalog),
            Arc::new(FakePlatform::default()),
            Session::new(),
        ))
    }

    #[test]
    fn latest_version_is_delivered() {
        let browser = browser();
        let receiver = browser
            .enumerate(1, artist_root_path("Artists"), false)
            .unwrap()
            .unwrap();
        let delivery = browser.accept(receiver.blocking_recv().unwrap()).unwrap();
        assert_eq!(delivery.version, 1);
        assert_eq!(delivery.listing.len(), 1);
        assert!(delivery.error.is_none());
        assert_eq!(browser.current_version(), None);
    }

    #[test]
    fn superseded_version_is_discarded() {
        let browser = browser();
        let first = browser
            .enumerate(1, artist_root_path("Artists"), false)
            .unwrap()
            .unwrap();
        let second = browser
            .enumerate(2, album_root_path("Albums"), false)
            .unwrap()
            .unwrap();
        assert!(browser.accept(first.blocking_recv().unwrap()).is_none());
        let delivery = browser.accept(second.blocking_recv().unwrap()).unwrap();
        assert_eq!(delivery.version, 2);
        assert_eq!(delivery.listing.entries[0].display_name, "Arrival");
    }

    #[test]
    fn result_is_accepted_only_once() {
        let browser = browser();
        let receiver = browser
            .enumerate(1, artist_root_path("Artists"), false)
            .unwrap()
            .unwrap();
        let message = receiver.blocking_recv().unwrap();
        let duplicate = JobMessage {
            version: message.version,
            path: message.path.clone(),
            outcome: JobOutcome::Completed(Listing::default()),
        };
        assert!(browser.accept(message).is_some());
        assert!(browser.accept(duplicate).is_none());
    }

    #[test]
    fn cancelled_job_delivers_nothing() {
        let browser = browser();
        let receiver = browser
            .enumerate(4, artist_root_path("Artists"), false)
            .unwrap()
            .unwrap();
        browser.cancel_enumeration(4);
        assert_eq!(browser.current_version(), None);
        assert!(browser.accept(receiver.blocking_recv().unwrap()).is_none());
    }

    #[test]
    fn cancel_enumeration_ignores_other_versions() {
        let browser = browser();
        let _receiver = browser
            .enumerate(5, artist_root_path("Artists"), false)
            .unwrap()
            .unwrap();
        assert!(!browser.cancel_enumeration(4));
        assert_eq!(browser.current_version(), Some(5));
    }

    #[test]
    fn large_recursive_walk_is_superseded() {
        let temp = TempDir::new().unwrap();
        for dir in 0..100 {
            let sub = temp.path().join(format!("d{dir:03}"));
            fs::create_dir(&sub).unwrap();
            for file in 0..100 {
                File::create(sub.join(format!("f{file:03}.mp3"))).unwrap();
            }
        }
        let browser = browser();
        let walk = browser
            .enumerate(1, temp.path().to_string_lossy(), true)
            .unwrap()
            .unwrap();
        let quick = browser
            .enumerate(2, artist_root_path("Artists"), false)
            .unwrap()
            .unwrap();

        // The walk either stopped early or finished; it is dropped either way.
        assert!(browser.accept(walk.blocking_recv().unwrap()).is_none());
        let delivery = browser.accept(quick.blocking_recv().unwrap()).unwrap();
        assert_eq!(delivery.version, 2);
    }

    #[test]
    fn destroy_stops_all_deliveries() {
        let browser = browser();
        let receiver = browser
            .enumerate(1, artist_root_path("Artists"), false)
            .unwrap()
            .unwrap();
        browser.destroy();
        assert!(!browser.session().is_alive());
        assert!(browser.accept(receiver.blocking_recv().unwrap()).is_none());
        assert!(browser.enumerate(2, "", false).unwrap().is_none());
    }

    #[test]
    fn failure_is_delivered_with_partial_listing() {
        let browser = browser();
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let receiver = browser
            .enumerate(1, missing.to_string_lossy(), false)
            .unwrap()
            .unwrap();
        let delivery = browser.accept(receiver.blocking_recv().unwrap()).unwrap();
        assert!(matches!(delivery.error, Some(BrowseError::Io { .. })));
        assert!(delivery.listing.is_empty());
    }
}
