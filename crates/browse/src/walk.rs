//! Filesystem listing with optional recursive descent.
//!
//! Each directory's children are sorted (directories first, then name) right
//! after they are read; with recursion enabled every subdirectory's listing
//! is appended after its parent's, in that order. Only recognized audio files
//! are kept, while every directory is kept so it can be browsed into.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cancel::CancellationToken;
use crate::config::SupportedExtensions;
use crate::error::{BrowseError, Result};
use crate::order::SortMode;
use crate::types::Entry;

/// Growth step of a job's entry buffer.
pub const LIST_CHUNK: usize = 32;

/// Walk settings and counters for one job.
#[derive(Debug)]
pub struct WalkData<'a> {
    /// Number of files kept.
    pub num_files: usize,
    /// Number of directories kept.
    pub num_dirs: usize,
    /// Subdirectories that could not be read and were skipped.
    pub skipped_dirs: usize,
    extensions: &'a SupportedExtensions,
    token: &'a CancellationToken,
    recursive: bool,
}

impl<'a> WalkData<'a> {
    pub fn new(extensions: &'a SupportedExtensions, token: &'a CancellationToken) -> Self {
        Self {
            num_files: 0,
            num_dirs: 0,
            skipped_dirs: 0,
            extensions,
            token,
            recursive: false,
        }
    }

    /// Descends into every listed subdirectory.
    pub fn with_recursion(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Lists `root`.
    ///
    /// An unreadable `root` is an error. Unreadable subdirectories met while
    /// recursing are skipped and counted in `skipped_dirs`.
    ///
    /// Returns `Ok(None)` if the token was cancelled.
    pub fn walk_it(&mut self, root: &Path) -> Result<Option<Vec<Entry>>> {
        let mut entries = Vec::with_capacity(LIST_CHUNK);
        if self.token.checkpoint().is_none() {
            return Ok(None);
        }
        let read_dir = fs::read_dir(root).map_err(|source| BrowseError::io(root, source))?;
        match self.collect(read_dir, &mut entries) {
            Some(()) => Ok(Some(entries)),
            None => Ok(None),
        }
    }

    fn collect(&mut self, read_dir: fs::ReadDir, entries: &mut Vec<Entry>) -> Option<()> {
        self.token.checkpoint()?;
        // Real paths travel with their entries; `Entry::path` may be lossy.
        let mut children: Vec<(Entry, PathBuf)> = Vec::new();
        for child in read_dir {
            self.token.checkpoint()?;
            let Ok(child) = child else {
                continue;
            };
            let path = child.path();
            // Follows symlinks so linked folders can be browsed into.
            let is_dir = fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false);
            if !is_dir && !self.extensions.accepts(&path) {
                continue;
            }
            if is_dir {
                self.num_dirs += 1;
            } else {
                self.num_files += 1;
            }
            let file_name = child.file_name();
            if file_name.to_str().is_none() {
                log::debug!("non UTF-8 name listed lossily path={}", path.display());
            }
            let name = file_name.to_string_lossy().into_owned();
            let entry = Entry::filesystem(path.to_string_lossy(), name, is_dir);
            children.push((entry, path));
        }
        children.sort_by(|(a, _), (b, _)| SortMode::Filesystem.compare(a, b, ""));

        let mut subdirs = Vec::new();
        for (entry, path) in children {
            if entries.len() == entries.capacity() {
                entries.reserve(LIST_CHUNK);
            }
            if entry.is_directory {
                subdirs.push(path);
            }
            entries.push(entry);
        }

        if !self.recursive {
            return Some(());
        }
        for dir in subdirs {
            self.token.checkpoint()?;
            if is_symlink(&dir) {
                continue;
            }
            match fs::read_dir(&dir) {
                Ok(read_dir) => self.collect(read_dir, entries)?,
                Err(error) => {
                    log::debug!(
                        "subdirectory skipped path={} error={}",
                        dir.display(),
                        error
                    );
                    self.skipped_dirs += 1;
                }
            }
        }
        Some(())
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}
