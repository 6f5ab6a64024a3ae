//! Listing types produced by enumeration jobs.
//!
//! These are plain data; ordering lives in [`crate::order`] so an `Entry`
//! never carries sort-mode-specific logic.

use serde::{Deserialize, Serialize};

/// What an entry represents in the browse tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    PlainFile,
    Directory,
    Track,
    InternalStorage,
    ExternalStorage,
    ExternalStorageUsb,
    MusicShortcut,
    DownloadsShortcut,
    Favorite,
    Artist,
    ArtistRoot,
    Album,
    AlbumRoot,
    AlbumAsHeaderItem,
    TrackRoot,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlainFile => "plain_file",
            Self::Directory => "directory",
            Self::Track => "track",
            Self::InternalStorage => "internal_storage",
            Self::ExternalStorage => "external_storage",
            Self::ExternalStorageUsb => "external_storage_usb",
            Self::MusicShortcut => "music_shortcut",
            Self::DownloadsShortcut => "downloads_shortcut",
            Self::Favorite => "favorite",
            Self::Artist => "artist",
            Self::ArtistRoot => "artist_root",
            Self::Album => "album",
            Self::AlbumRoot => "album_root",
            Self::AlbumAsHeaderItem => "album_as_header_item",
            Self::TrackRoot => "track_root",
        }
    }

    /// Returns true for every kind that can be browsed into.
    pub fn is_directory(self) -> bool {
        !matches!(self, Self::PlainFile | Self::Track)
    }
}

/// One browsable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub is_directory: bool,
    /// Identifier in the unified path namespace, see [`crate::path`].
    pub path: String,
    /// Never empty; a lone space stands in for a missing name.
    pub display_name: String,
    pub kind: EntryKind,
    pub album_id: Option<i64>,
    /// Artist id, or playlist id when the entry represents a playlist.
    pub catalog_row_id: Option<i64>,
    /// Album count for an artist, track count for an album, track number for
    /// a track.
    pub track_or_album_count: i32,
    /// Track count for an artist; `None` for every other kind.
    pub artist_track_count: Option<i32>,
}

impl Entry {
    /// Creates an entry whose directory-ness follows from `kind`.
    pub fn new(path: impl Into<String>, display_name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            is_directory: kind.is_directory(),
            path: path.into(),
            display_name: non_empty_name(display_name.into()),
            kind,
            album_id: None,
            catalog_row_id: None,
            track_or_album_count: 0,
            artist_track_count: None,
        }
    }

    /// Creates an entry for a real filesystem item.
    pub fn filesystem(
        path: impl Into<String>,
        display_name: impl Into<String>,
        is_directory: bool,
    ) -> Self {
        let kind = if is_directory {
            EntryKind::Directory
        } else {
            EntryKind::PlainFile
        };
        Self::new(path, display_name, kind)
    }

    /// Creates an album entry.
    pub fn album(path: impl Into<String>, display_name: impl Into<String>, album_id: i64) -> Self {
        let mut entry = Self::new(path, display_name, EntryKind::Album);
        entry.album_id = Some(album_id);
        entry
    }
}

fn non_empty_name(name: String) -> String {
    if name.is_empty() {
        " ".to_string()
    } else {
        name
    }
}

/// One jump-index bucket: the normalized first letter and where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub letter: char,
    pub start_index: usize,
}

/// The result of one enumeration job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub entries: Vec<Entry>,
    /// Present only for listings shown directly to a human.
    pub sections: Option<Vec<Section>>,
    /// Album failures hidden by the partial catalog failure policy.
    pub suppressed_errors: usize,
}

impl Listing {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            sections: None,
            suppressed_errors: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_display_name_becomes_space() {
        let entry = Entry::new("/music", "", EntryKind::Directory);
        assert_eq!(entry.display_name, " ");
    }

    #[test]
    fn directory_flag_follows_kind() {
        assert!(Entry::new("@*Artists", "Artists", EntryKind::ArtistRoot).is_directory);
        assert!(Entry::album("!/3*Albums\u{1A}X", "X", 3).is_directory);
        assert!(!Entry::new("/a.mp3", "a.mp3", EntryKind::Track).is_directory);
        assert!(!Entry::filesystem("/a.mp3", "a.mp3", false).is_directory);
    }
}
