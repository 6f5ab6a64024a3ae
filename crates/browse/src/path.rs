//! Unified path namespace.
//!
//! One string space covers real filesystem paths and the two virtual catalog
//! hierarchies. The first character decides the family:
//!
//! ```text
//! @*Artists                                  artist catalog root
//! @/42*Artists<SUB>Daft Punk                 every track of artist 42
//! @/42/7*Artists<SUB>Daft Punk<SUB>Discovery tracks of album 7 by artist 42
//! !*Albums                                   album catalog root
//! !/7*Albums<SUB>Discovery                   tracks of album 7
//! /storage/emulated/0/Music                  filesystem directory
//! ```
//!
//! Everything before the first `*` is the real component (database ids);
//! everything from `*` on is a human-readable tail whose segments are
//! separated by U+001A.

use crate::error::{BrowseError, Result};

pub const ARTIST_ROOT_CHAR: char = '@';
pub const ALBUM_ROOT_CHAR: char = '!';
pub const FAKE_PATH_ROOT_CHAR: char = '*';
pub const FAKE_PATH_SEPARATOR_CHAR: char = '\u{1A}';
pub const VIRTUAL_SEPARATOR_CHAR: char = '/';
pub const ARTIST_PREFIX: &str = "@*";
pub const ALBUM_PREFIX: &str = "!*";

/// A decoded path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowsePath<'a> {
    /// The empty path: storage roots and shortcuts.
    Root,
    /// A real filesystem directory.
    Filesystem(&'a str),
    /// Listing of every artist.
    ArtistRoot { tail: &'a str },
    /// Every track of one artist, grouped by album.
    Artist { artist_id: i64, tail: &'a str },
    /// Listing of every album.
    AlbumRoot { tail: &'a str },
    /// Tracks of one album, optionally restricted to one artist.
    AlbumTracks {
        artist_id: Option<i64>,
        album_id: i64,
        tail: &'a str,
    },
}

impl<'a> BrowsePath<'a> {
    /// Classifies an encoded path.
    pub fn parse(path: &'a str) -> Result<Self> {
        let Some(first) = path.chars().next() else {
            return Ok(Self::Root);
        };
        match first {
            ARTIST_ROOT_CHAR => {
                if let Some(tail) = path.strip_prefix(ARTIST_ROOT_CHAR) {
                    if tail.starts_with(FAKE_PATH_ROOT_CHAR) {
                        return Ok(Self::ArtistRoot { tail });
                    }
                }
                let (real, tail) = split_virtual(path)?;
                let first_sep = real.find(VIRTUAL_SEPARATOR_CHAR);
                let last_sep = real.rfind(VIRTUAL_SEPARATOR_CHAR);
                match (first_sep, last_sep) {
                    (Some(p1), Some(p2)) if p1 != p2 => Ok(Self::AlbumTracks {
                        artist_id: Some(parse_id(&real[p1 + 1..p2], path)?),
                        album_id: parse_id(&real[p2 + 1..], path)?,
                        tail,
                    }),
                    (Some(p1), _) => Ok(Self::Artist {
                        artist_id: parse_id(&real[p1 + 1..], path)?,
                        tail,
                    }),
                    _ => Err(BrowseError::InvalidPath(path.to_string())),
                }
            }
            ALBUM_ROOT_CHAR => {
                if let Some(tail) = path.strip_prefix(ALBUM_ROOT_CHAR) {
                    if tail.starts_with(FAKE_PATH_ROOT_CHAR) {
                        return Ok(Self::AlbumRoot { tail });
                    }
                }
                let (real, tail) = split_virtual(path)?;
                let album_start = real
                    .rfind(VIRTUAL_SEPARATOR_CHAR)
                    .ok_or_else(|| BrowseError::InvalidPath(path.to_string()))?;
                Ok(Self::AlbumTracks {
                    artist_id: None,
                    album_id: parse_id(&real[album_start + 1..], path)?,
                    tail,
                })
            }
            _ => Ok(Self::Filesystem(path)),
        }
    }

    /// Returns true for paths answered by the media catalog.
    pub fn is_virtual(&self) -> bool {
        !matches!(self, Self::Root | Self::Filesystem(_))
    }

    /// Returns the human-readable tail of a virtual path, without the
    /// leading `*`.
    pub fn tail(&self) -> Option<&'a str> {
        match self {
            Self::Root | Self::Filesystem(_) => None,
            Self::ArtistRoot { tail }
            | Self::Artist { tail, .. }
            | Self::AlbumRoot { tail }
            | Self::AlbumTracks { tail, .. } => Some(&tail[FAKE_PATH_ROOT_CHAR.len_utf8()..]),
        }
    }

    /// Breadcrumb labels of a virtual path, outermost first.
    pub fn display_segments(&self) -> Vec<&'a str> {
        self.tail()
            .map(|tail| tail.split(FAKE_PATH_SEPARATOR_CHAR).collect())
            .unwrap_or_default()
    }

    /// The innermost display label of a virtual path.
    pub fn display_name(&self) -> Option<&'a str> {
        self.tail()
            .and_then(|tail| tail.rsplit(FAKE_PATH_SEPARATOR_CHAR).next())
    }
}

/// Splits a virtual path at the first `*`.
fn split_virtual(path: &str) -> Result<(&str, &str)> {
    path.find(FAKE_PATH_ROOT_CHAR)
        .map(|index| path.split_at(index))
        .ok_or_else(|| BrowseError::InvalidPath(path.to_string()))
}

fn parse_id(raw: &str, path: &str) -> Result<i64> {
    raw.parse::<i64>()
        .map_err(|_| BrowseError::InvalidPath(path.to_string()))
}

/// Path of the artist catalog root.
pub fn artist_root_path(artists_label: &str) -> String {
    format!("{ARTIST_PREFIX}{artists_label}")
}

/// Path of the album catalog root.
pub fn album_root_path(albums_label: &str) -> String {
    format!("{ALBUM_PREFIX}{albums_label}")
}

/// Path of one artist, listing all of the artist's tracks.
pub fn artist_path(artist_id: i64, name: &str, artists_label: &str) -> String {
    format!(
        "{ARTIST_ROOT_CHAR}{VIRTUAL_SEPARATOR_CHAR}{artist_id}{FAKE_PATH_ROOT_CHAR}{artists_label}{FAKE_PATH_SEPARATOR_CHAR}{name}"
    )
}

/// Path of one album outside any artist scope.
pub fn album_path(album_id: i64, name: &str, albums_label: &str) -> String {
    format!(
        "{ALBUM_ROOT_CHAR}{VIRTUAL_SEPARATOR_CHAR}{album_id}{FAKE_PATH_ROOT_CHAR}{albums_label}{FAKE_PATH_SEPARATOR_CHAR}{name}"
    )
}

/// Path of one album scoped under `artist_path`.
pub fn artist_album_path(artist_path: &str, album_id: i64, name: &str) -> Result<String> {
    let (real, tail) = split_virtual(artist_path)?;
    Ok(format!(
        "{real}{VIRTUAL_SEPARATOR_CHAR}{album_id}{tail}{FAKE_PATH_SEPARATOR_CHAR}{name}"
    ))
}

/// Strips trailing separators from a filesystem path, keeping a lone root.
pub fn trim_trailing_separator(path: &str) -> &str {
    let trimmed = path.trim_end_matches(std::path::MAIN_SEPARATOR);
    if trimmed.is_empty() && !path.is_empty() {
        &path[..std::path::MAIN_SEPARATOR.len_utf8()]
    } else {
        trimmed
    }
}
