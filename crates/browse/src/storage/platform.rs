//! Platform collaborator for storage root discovery.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::canonicalize_existing_path;

/// Everything root discovery needs from the host platform.
pub trait StoragePlatform: Send + Sync {
    /// The public music directory, if the platform has one.
    fn music_dir(&self) -> Option<PathBuf>;

    /// The public downloads directory, if the platform has one.
    fn downloads_dir(&self) -> Option<PathBuf>;

    /// The primary storage root.
    fn primary_storage(&self) -> Option<PathBuf>;

    /// Whether the primary storage root is removable media.
    fn is_primary_removable(&self) -> bool;

    /// Raw mount table text, one `source destination fstype [options]` line per mount.
    fn read_mount_table(&self) -> io::Result<String>;

    /// Per-app directories living on additional volumes.
    fn app_external_dirs(&self) -> Vec<PathBuf>;

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

const PROC_MOUNTS: &str = "/proc/mounts";

/// Desktop implementation backed by the `dirs` crate and `/proc/mounts`.
#[derive(Debug, Clone, Default)]
pub struct SystemPlatform {
    primary_storage: Option<PathBuf>,
    primary_removable: bool,
    app_external_dirs: Vec<PathBuf>,
}

impl SystemPlatform {
    pub fn new() -> Self {
        Self {
            primary_storage: dirs::home_dir().map(canonicalize_existing_path),
            primary_removable: false,
            app_external_dirs: Vec::new(),
        }
    }

    pub fn with_primary_storage(mut self, path: PathBuf, removable: bool) -> Self {
        self.primary_storage = Some(path);
        self.primary_removable = removable;
        self
    }

    pub fn with_app_external_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.app_external_dirs = dirs;
        self
    }
}

impl StoragePlatform for SystemPlatform {
    fn music_dir(&self) -> Option<PathBuf> {
        dirs::audio_dir()
    }

    fn downloads_dir(&self) -> Option<PathBuf> {
        dirs::download_dir()
    }

    fn primary_storage(&self) -> Option<PathBuf> {
        self.primary_storage.clone()
    }

    fn is_primary_removable(&self) -> bool {
        self.primary_removable
    }

    fn read_mount_table(&self) -> io::Result<String> {
        match fs::read_to_string(PROC_MOUNTS) {
            Ok(table) => Ok(table),
            Err(error) => {
                log::debug!("mount table fallback source={PROC_MOUNTS} error={error}");
                let output = Command::new("mount").output()?;
                if !output.status.success() {
                    return Err(io::Error::new(
                        io::ErrorKind::Other,
                        format!("mount exited with {}", output.status),
                    ));
                }
                Ok(mount_output_to_table(&String::from_utf8_lossy(&output.stdout)))
            }
        }
    }

    fn app_external_dirs(&self) -> Vec<PathBuf> {
        self.app_external_dirs.clone()
    }
}

/// Rewrites `mount` command output into `source destination fstype options`
/// lines.
///
/// Handles both `dev on /path type fs (opts)` and the BSD form
/// `dev on /path (fs, opts)`. Lines in neither form are kept as they are.
pub(crate) fn mount_output_to_table(output: &str) -> String {
    output
        .lines()
        .map(|line| mount_output_line(line).unwrap_or_else(|| line.to_string()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn mount_output_line(line: &str) -> Option<String> {
    let (source, rest) = line.split_once(" on ")?;
    let (path, fstype, options) = match rest.rsplit_once(" type ") {
        Some((path, tail)) => {
            let (fstype, options) = tail.split_once(' ').unwrap_or((tail, ""));
            (path, fstype, options)
        }
        None => {
            let (path, options) = rest.rsplit_once(" (")?;
            let fstype = options.split(',').next()?.trim_end_matches(')');
            (path, fstype, options)
        }
    };
    let options = options.trim().trim_start_matches('(').trim_end_matches(')');
    Some(format!("{source} {path} {fstype} {options}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::parse_line;

    #[test]
    fn linux_mount_output_is_rewritten() {
        let table = mount_output_to_table("/dev/sdb1 on /media/usbstick type vfat (rw,nosuid)");
        assert_eq!(table, "/dev/sdb1 /media/usbstick vfat rw,nosuid");
        let candidate = parse_line(&table).unwrap();
        assert_eq!(candidate.filesystem_spec, "/dev/sdb1");
        assert_eq!(candidate.mount_path, "/media/usbstick");
        assert!(candidate.looks_like_removable_or_fuse);
    }

    #[test]
    fn bsd_mount_output_is_rewritten() {
        let table = mount_output_to_table(
            "/dev/disk2s1 on /Volumes/CARD (msdos, local, nodev)\n/dev/disk1s1 on / (apfs, local)",
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "/dev/disk2s1 /Volumes/CARD msdos msdos, local, nodev");
        assert_eq!(parse_line(lines[1]).unwrap().mount_path, "/");
    }

    #[test]
    fn mount_options_still_mark_secure_storage() {
        let table = mount_output_to_table("/dev/fuse on /mnt/secure/asec type fuse (rw)");
        assert!(parse_line(&table).is_none());
    }

    #[test]
    fn table_lines_pass_through() {
        let line = "/dev/block/vold/179:1 /mnt/sdcard vfat rw 0 0";
        assert_eq!(mount_output_to_table(line), line);
    }
}
