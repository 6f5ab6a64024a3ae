//! Listing orders.
//!
//! The engine picks one [`SortMode`] per listing; entries themselves carry no
//! ordering logic. All sorts are stable.

use std::cmp::Ordering;

use crate::types::Entry;

/// Ordering strategy for one listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Directories first, then case-insensitive name.
    Filesystem,
    /// Unknown placeholder first, then case-insensitive name.
    Artists,
    /// Unknown placeholder first, then directories first and case-insensitive name.
    Albums,
    /// Track number ascending, then case-insensitive name.
    Tracks,
}

impl SortMode {
    /// Compares two entries under this mode.
    pub fn compare(self, a: &Entry, b: &Entry, unknown_label: &str) -> Ordering {
        match self {
            Self::Filesystem => directories_first(a, b),
            Self::Artists => unknown_first(a, b, unknown_label)
                .then_with(|| cmp_ignore_case(&a.display_name, &b.display_name)),
            Self::Albums => {
                unknown_first(a, b, unknown_label).then_with(|| directories_first(a, b))
            }
            Self::Tracks => a
                .track_or_album_count
                .cmp(&b.track_or_album_count)
                .then_with(|| cmp_ignore_case(&a.display_name, &b.display_name)),
        }
    }
}

/// Sorts `entries` in place under `mode`.
pub fn sort_entries(entries: &mut [Entry], mode: SortMode, unknown_label: &str) {
    entries.sort_by(|a, b| mode.compare(a, b, unknown_label));
}

/// Compares two strings ignoring case, char by char.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

fn directories_first(a: &Entry, b: &Entry) -> Ordering {
    match (a.is_directory, b.is_directory) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => cmp_ignore_case(&a.display_name, &b.display_name),
    }
}

fn unknown_first(a: &Entry, b: &Entry, unknown_label: &str) -> Ordering {
    match (a.display_name == unknown_label, b.display_name == unknown_label) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
