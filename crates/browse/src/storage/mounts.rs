//! Mount table parsing and mount indirection resolution.

use std::collections::{HashMap, HashSet};

/// Maximum number of hops followed while resolving a mount destination.
pub const MAX_MOUNT_HOPS: usize = 4;

/// Mount points some platforms report even though they never hold media.
const BOGUS_MOUNT_POINTS: &[&str] = &["/system", "/data", "/cache", "/firmware"];

/// One parsed mount table line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRootCandidate {
    pub filesystem_spec: String,
    pub mount_path: String,
    pub looks_like_removable_or_fuse: bool,
    spec_lc: String,
    path_lc: String,
}

impl StorageRootCandidate {
    pub fn new(
        filesystem_spec: &str,
        mount_path: &str,
        looks_like_removable_or_fuse: bool,
    ) -> Self {
        Self {
            filesystem_spec: filesystem_spec.to_string(),
            mount_path: mount_path.to_string(),
            looks_like_removable_or_fuse,
            spec_lc: filesystem_spec.to_lowercase(),
            path_lc: mount_path.to_lowercase(),
        }
    }
}

/// Candidates keyed by lowercased source spec, in first-seen order.
#[derive(Debug, Default)]
pub struct MountTable {
    candidates: Vec<StorageRootCandidate>,
    by_spec: HashMap<String, usize>,
}

impl MountTable {
    /// Parses mount table text. A later line with the same source spec
    /// replaces the earlier one.
    ///
    /// Returns `None` if `keep_going` reports cancellation.
    pub fn parse(text: &str, mut keep_going: impl FnMut() -> Option<()>) -> Option<Self> {
        let mut table = Self::default();
        for line in text.lines() {
            keep_going()?;
            if let Some(candidate) = parse_line(line) {
                table.insert(candidate);
            }
        }
        Some(table)
    }

    fn insert(&mut self, candidate: StorageRootCandidate) {
        match self.by_spec.get(&candidate.spec_lc) {
            Some(&index) => self.candidates[index] = candidate,
            None => {
                self.by_spec
                    .insert(candidate.spec_lc.clone(), self.candidates.len());
                self.candidates.push(candidate);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, spec: &str) -> Option<&StorageRootCandidate> {
        self.by_spec
            .get(&spec.to_lowercase())
            .map(|&index| &self.candidates[index])
    }

    pub fn candidates(&self) -> impl Iterator<Item = &StorageRootCandidate> {
        self.candidates.iter()
    }

    /// Follows `mount_path -> source spec` links starting at `candidate`.
    ///
    /// Stops after [`MAX_MOUNT_HOPS`] hops or when a path repeats.
    pub fn resolve<'a>(&'a self, candidate: &'a StorageRootCandidate) -> &'a StorageRootCandidate {
        let mut current = candidate;
        let mut visited = HashSet::new();
        visited.insert(current.path_lc.as_str());
        for _ in 0..MAX_MOUNT_HOPS {
            let Some(&index) = self.by_spec.get(&current.path_lc) else {
                break;
            };
            let next = &self.candidates[index];
            if !visited.insert(next.path_lc.as_str()) {
                break;
            }
            current = next;
        }
        current
    }

    /// Mount paths worth probing as storage volumes, after indirection
    /// resolution and bogus mount point filtering.
    ///
    /// Returns `None` if `keep_going` reports cancellation.
    pub fn volume_paths(&self, mut keep_going: impl FnMut() -> Option<()>) -> Option<Vec<String>> {
        let mut paths = Vec::new();
        for candidate in self.candidates.iter().filter(|c| c.looks_like_removable_or_fuse) {
            keep_going()?;
            let resolved = self.resolve(candidate);
            if is_bogus_mount_point(&resolved.path_lc) {
                log::debug!("mount point ignored path={}", resolved.mount_path);
                continue;
            }
            paths.push(resolved.mount_path.clone());
        }
        Some(paths)
    }
}

/// Parses `source destination fstype [options]`.
///
/// Lines mentioning secure or asec storage are skipped because they are not
/// readable.
pub fn parse_line(line: &str) -> Option<StorageRootCandidate> {
    if line.is_empty() || line.contains("secure") || line.contains("asec") {
        return None;
    }
    let first = line.find(' ')?;
    if first == 0 {
        return None;
    }
    let rest = &line[first + 1..];
    let second = rest.find(' ')?;
    let spec = &line[..first];
    let path = &rest[..second];
    let valid = line.contains("fat")
        || line.contains("fuse")
        || (path.starts_with("/mnt/") && spec != "tmpfs");
    Some(StorageRootCandidate::new(spec, path, valid))
}

fn is_bogus_mount_point(path_lc: &str) -> bool {
    BOGUS_MOUNT_POINTS.contains(&path_lc)
}
