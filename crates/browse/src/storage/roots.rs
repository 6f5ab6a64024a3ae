//! Root listing: shortcuts plus every distinct storage volume.

use std::path::{Path, PathBuf};

use super::mounts::MountTable;
use super::platform::StoragePlatform;
use crate::cancel::CancellationToken;
use crate::config::Labels;
use crate::error::{BrowseError, Result};
use crate::types::{Entry, EntryKind};

/// Upper bound on accepted storage roots.
pub const MAX_STORAGE_ROOTS: usize = 16;
/// Extra canonicalization passes used to settle multi-hop symlinks.
pub const MAX_CANONICALIZE_PASSES: usize = 4;

/// Storage root accumulator for one discovery run.
struct RootCollector<'a> {
    platform: &'a dyn StoragePlatform,
    labels: &'a Labels,
    entries: Vec<Entry>,
    accepted: Vec<String>,
    internal_count: usize,
    external_count: usize,
    usb_count: usize,
}

impl<'a> RootCollector<'a> {
    fn new(platform: &'a dyn StoragePlatform, labels: &'a Labels) -> Self {
        Self {
            platform,
            labels,
            entries: Vec::new(),
            accepted: Vec::with_capacity(MAX_STORAGE_ROOTS),
            internal_count: 0,
            external_count: 0,
            usb_count: 0,
        }
    }

    /// Canonicalizes, deduplicates and classifies one candidate volume.
    ///
    /// Returns `Ok(false)` when the path was rejected.
    fn add_storage(&mut self, path: &Path, is_external: bool) -> Result<bool> {
        if !self.platform.is_dir(path) || self.accepted.len() >= MAX_STORAGE_ROOTS {
            return Ok(false);
        }

        let canonical = self
            .platform
            .canonicalize(path)
            .map_err(|source| BrowseError::io(path, source))?;
        let canonical = settle_canonical_path(self.platform, canonical);
        let canonical_str = canonical.to_string_lossy().into_owned();
        let canonical_lc = canonical_str.to_lowercase();

        if self.accepted.iter().any(|seen| *seen == canonical_lc) {
            return Ok(false);
        }

        let entry = if !is_external {
            self.internal_count += 1;
            Entry::new(
                canonical_str,
                self.labels.internal_storage.clone(),
                EntryKind::InternalStorage,
            )
        } else if canonical_lc.contains("usb") {
            self.usb_count += 1;
            Entry::new(
                canonical_str,
                numbered_label(&self.labels.usb_storage, self.usb_count),
                EntryKind::ExternalStorageUsb,
            )
        } else {
            if self.internal_count > 0 && canonical_lc.contains("/legacy") {
                log::debug!("storage root alias ignored path={canonical_str}");
                return Ok(false);
            }
            self.external_count += 1;
            Entry::new(
                canonical_str,
                numbered_label(&self.labels.external_storage, self.external_count),
                EntryKind::ExternalStorage,
            )
        };

        self.accepted.push(canonical_lc);
        self.entries.push(entry);
        Ok(true)
    }

    /// Like [`Self::add_storage`] but logs and swallows failures.
    fn try_add_storage(&mut self, path: &Path, is_external: bool) {
        if let Err(error) = self.add_storage(path, is_external) {
            log::warn!(
                "storage root rejected path={} error={}",
                path.display(),
                error
            );
        }
    }
}

/// Re-canonicalizes until the lowercased path stops changing.
fn settle_canonical_path(platform: &dyn StoragePlatform, mut canonical: PathBuf) -> PathBuf {
    let mut canonical_lc = canonical.to_string_lossy().to_lowercase();
    for _ in 0..MAX_CANONICALIZE_PASSES {
        let next = match platform.canonicalize(&canonical) {
            Ok(next) => next,
            Err(error) => {
                log::warn!(
                    "storage root canonicalization failed path={} error={}",
                    canonical.display(),
                    error
                );
                break;
            }
        };
        let next_lc = next.to_string_lossy().to_lowercase();
        if next_lc == canonical_lc {
            break;
        }
        canonical = next;
        canonical_lc = next_lc;
    }
    canonical
}

fn numbered_label(label: &str, count: usize) -> String {
    if count <= 1 {
        label.to_string()
    } else {
        format!("{label} {count}")
    }
}

/// Recovers a volume root from a per-app directory such as
/// `/storage/1234-5678/Android/data/app/files`.
fn volume_root_of_app_dir(path: &Path) -> Option<PathBuf> {
    let raw = path.to_string_lossy();
    let index = raw.find("/Android")?;
    if index == 0 {
        return None;
    }
    Some(PathBuf::from(&raw[..index]))
}

/// Builds the root listing.
///
/// Returns `None` if the token was cancelled.
pub fn discover_storage_roots(
    platform: &dyn StoragePlatform,
    labels: &Labels,
    token: &CancellationToken,
) -> Option<Vec<Entry>> {
    let mut shortcuts = Vec::new();
    if let Some(music) = platform.music_dir().filter(|dir| platform.is_dir(dir)) {
        shortcuts.push(Entry::new(
            music.to_string_lossy(),
            labels.music.clone(),
            EntryKind::MusicShortcut,
        ));
    }
    if let Some(downloads) = platform.downloads_dir().filter(|dir| platform.is_dir(dir)) {
        shortcuts.push(Entry::new(
            downloads.to_string_lossy(),
            labels.downloads.clone(),
            EntryKind::DownloadsShortcut,
        ));
    }
    token.checkpoint()?;

    let mut collector = RootCollector::new(platform, labels);
    if let Some(primary) = platform.primary_storage() {
        collector.try_add_storage(&primary, platform.is_primary_removable());
    }

    match platform.read_mount_table() {
        Ok(text) => {
            let table = MountTable::parse(&text, || token.checkpoint())?;
            for path in table.volume_paths(|| token.checkpoint())? {
                token.checkpoint()?;
                collector.try_add_storage(Path::new(&path), true);
            }
        }
        Err(error) => {
            log::warn!("{}", BrowseError::MountTable(error));
        }
    }

    for dir in platform.app_external_dirs() {
        token.checkpoint()?;
        if let Some(root) = volume_root_of_app_dir(&dir) {
            collector.try_add_storage(&root, true);
        }
    }

    log::debug!(
        "storage roots discovered internal={} external={} usb={}",
        collector.internal_count,
        collector.external_count,
        collector.usb_count
    );

    shortcuts.append(&mut collector.entries);
    Some(shortcuts)
}
