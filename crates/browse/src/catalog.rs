//! Media catalog queries: artists, albums and tracks as virtual listings.

use std::path::Path;

use crate::cancel::CancellationToken;
use crate::config::Labels;
use crate::error::{BrowseError, Result};
use crate::order::{sort_entries, SortMode};
use crate::path::{album_path, artist_album_path, artist_path};
use crate::types::{Entry, EntryKind, Listing};

/// Name some catalogs report for rows without a tag.
pub const UNKNOWN_SENTINEL: &str = "<unknown>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistRow {
    pub id: i64,
    pub name: Option<String>,
    pub album_count: i32,
    pub track_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumRow {
    pub id: i64,
    pub name: Option<String>,
    pub track_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRow {
    /// Real file path of the track.
    pub path: String,
    pub title: Option<String>,
    pub track_number: i32,
}

/// Read-only media index.
///
/// `Ok(None)` means the query produced no row set at all; the listing is
/// then empty rather than failed.
pub trait MediaCatalog: Send + Sync {
    fn artists(&self) -> Result<Option<Vec<ArtistRow>>>;

    /// Albums of one artist, or every album when `artist_id` is `None`.
    fn albums(&self, artist_id: Option<i64>) -> Result<Option<Vec<AlbumRow>>>;

    /// Tracks of one album, optionally restricted to one artist.
    fn tracks(&self, album_id: i64, artist_id: Option<i64>) -> Result<Option<Vec<TrackRow>>>;
}

fn display_name(name: Option<String>, unknown_label: &str) -> String {
    match name {
        Some(name) if name != UNKNOWN_SENTINEL => name,
        _ => unknown_label.to_string(),
    }
}

/// Lists every artist, sorted with the unknown placeholder first.
///
/// Returns `Ok(None)` if the token was cancelled.
pub fn fetch_artists(
    catalog: &dyn MediaCatalog,
    labels: &Labels,
    token: &CancellationToken,
) -> Result<Option<Vec<Entry>>> {
    let Some(rows) = catalog.artists()? else {
        return Ok(Some(Vec::new()));
    };
    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        if token.checkpoint().is_none() {
            return Ok(None);
        }
        let name = display_name(row.name, &labels.unknown_artist);
        let mut entry = Entry::new(
            artist_path(row.id, &name, &labels.artists),
            name,
            EntryKind::Artist,
        );
        entry.catalog_row_id = Some(row.id);
        entry.track_or_album_count = row.album_count;
        entry.artist_track_count = Some(row.track_count);
        entries.push(entry);
    }
    sort_entries(&mut entries, SortMode::Artists, &labels.unknown_artist);
    Ok(Some(entries))
}

/// Lists albums, either all of them or those of the artist at `scope`.
///
/// Returns `Ok(None)` if the token was cancelled.
pub fn fetch_albums(
    catalog: &dyn MediaCatalog,
    labels: &Labels,
    scope: Option<(i64, &str)>,
    token: &CancellationToken,
) -> Result<Option<Vec<Entry>>> {
    let Some(rows) = catalog.albums(scope.map(|(artist_id, _)| artist_id))? else {
        return Ok(Some(Vec::new()));
    };
    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        if token.checkpoint().is_none() {
            return Ok(None);
        }
        let name = display_name(row.name, &labels.unknown_artist);
        let path = match scope {
            Some((_, scope_path)) => artist_album_path(scope_path, row.id, &name)?,
            None => album_path(row.id, &name, &labels.albums),
        };
        let mut entry = Entry::album(path, name, row.id);
        entry.track_or_album_count = row.track_count;
        entries.push(entry);
    }
    sort_entries(&mut entries, SortMode::Albums, &labels.unknown_artist);
    Ok(Some(entries))
}

/// Lists the tracks of one album, ordered by track number.
///
/// Returns `Ok(None)` if the token was cancelled.
pub fn fetch_tracks(
    catalog: &dyn MediaCatalog,
    album_id: i64,
    artist_id: Option<i64>,
    token: &CancellationToken,
) -> Result<Option<Vec<Entry>>> {
    let Some(rows) = catalog.tracks(album_id, artist_id)? else {
        return Ok(Some(Vec::new()));
    };
    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        if token.checkpoint().is_none() {
            return Ok(None);
        }
        let name = row.title.unwrap_or_else(|| {
            Path::new(&row.path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let mut entry = Entry::new(row.path, name, EntryKind::Track);
        entry.album_id = Some(album_id);
        entry.track_or_album_count = row.track_number;
        entries.push(entry);
    }
    sort_entries(&mut entries, SortMode::Tracks, "");
    Ok(Some(entries))
}

/// Flattens every track of one artist, each album's tracks preceded by the
/// album as a header entry.
///
/// Album failures are tolerated as long as at least one track was collected;
/// the listing then records how many albums were skipped.
///
/// Returns `Ok(None)` if the token was cancelled.
pub fn fetch_artist_tracks(
    catalog: &dyn MediaCatalog,
    labels: &Labels,
    artist_id: i64,
    artist_path: &str,
    token: &CancellationToken,
) -> Result<Option<Listing>> {
    let Some(albums) = fetch_albums(catalog, labels, Some((artist_id, artist_path)), token)? else {
        return Ok(None);
    };

    let mut collected = Vec::with_capacity(albums.len() * 11);
    let mut failed_albums = 0usize;
    let mut last_error = None;
    for mut album in albums {
        if token.checkpoint().is_none() {
            return Ok(None);
        }
        let Some(album_id) = album.album_id else {
            continue;
        };
        match fetch_tracks(catalog, album_id, Some(artist_id), token) {
            Ok(None) => return Ok(None),
            Ok(Some(tracks)) if tracks.is_empty() => {}
            Ok(Some(tracks)) => {
                album.kind = EntryKind::AlbumAsHeaderItem;
                collected.reserve(tracks.len() + 1);
                collected.push(album);
                collected.extend(tracks);
            }
            Err(error) => {
                log::warn!(
                    "album tracks unavailable artist_id={} album_id={} error={}",
                    artist_id,
                    album_id,
                    error
                );
                failed_albums += 1;
                last_error = Some(error);
            }
        }
    }

    if collected.is_empty() {
        if let Some(error) = last_error {
            return Err(BrowseError::PartialCatalog {
                failed_albums,
                source: Box::new(error),
            });
        }
        return Ok(Some(Listing::default()));
    }

    let mut listing = Listing::new(collected);
    listing.suppressed_errors = failed_albums;
    Ok(Some(listing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCatalog;

    fn labels() -> Labels {
        Labels {
            unknown_artist: "Unknown".to_string(),
            ..Labels::default()
        }
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.display_name.as_str()).collect()
    }

    #[test]
    fn unknown_artist_is_placed_first() {
        let catalog = FakeCatalog::default()
            .with_artist(1, Some("Zed"), 2, 20)
            .with_artist(2, None, 1, 3)
            .with_artist(3, Some("Abba"), 8, 90);
        let entries = fetch_artists(&catalog, &labels(), &CancellationToken::new())
            .unwrap()
            .unwrap();
        assert_eq!(names(&entries), vec!["Unknown", "Abba", "Zed"]);
        assert_eq!(entries[1].catalog_row_id, Some(3));
        assert_eq!(entries[1].track_or_album_count, 8);
        assert_eq!(entries[1].artist_track_count, Some(90));
        assert_eq!(entries[1].path, "@/3*Artists\u{1A}Abba");
    }

    #[test]
    fn unknown_sentinel_maps_to_placeholder() {
        let catalog = FakeCatalog::default().with_artist(9, Some(UNKNOWN_SENTINEL), 1, 1);
        let entries = fetch_artists(&catalog, &labels(), &CancellationToken::new())
            .unwrap()
            .unwrap();
        assert_eq!(names(&entries), vec!["Unknown"]);
    }

    #[test]
    fn missing_row_set_is_an_empty_listing() {
        let catalog = FakeCatalog::default().without_row_sets();
        let token = CancellationToken::new();
        assert!(fetch_artists(&catalog, &labels(), &token).unwrap().unwrap().is_empty());
        assert!(fetch_albums(&catalog, &labels(), None, &token).unwrap().unwrap().is_empty());
        assert!(fetch_tracks(&catalog, 1, None, &token).unwrap().unwrap().is_empty());
    }

    #[test]
    fn albums_get_unscoped_paths_and_track_counts() {
        let catalog = FakeCatalog::default()
            .with_album(None, 7, Some("Discovery"), 14)
            .with_album(None, 8, Some("alive"), 10);
        let entries = fetch_albums(&catalog, &labels(), None, &CancellationToken::new())
            .unwrap()
            .unwrap();
        assert_eq!(names(&entries), vec!["alive", "Discovery"]);
        assert_eq!(entries[1].path, "!/7*Albums\u{1A}Discovery");
        assert_eq!(entries[1].album_id, Some(7));
        assert_eq!(entries[1].track_or_album_count, 14);
    }

    #[test]
    fn tracks_sort_by_track_number() {
        let catalog = FakeCatalog::default()
            .with_track(5, "/m/c.mp3", Some("c"), 3)
            .with_track(5, "/m/a.mp3", Some("a"), 1)
            .with_track(5, "/m/b.mp3", Some("b"), 2);
        let entries = fetch_tracks(&catalog, 5, None, &CancellationToken::new())
            .unwrap()
            .unwrap();
        let numbers: Vec<i32> = entries.iter().map(|e| e.track_or_album_count).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(entries.iter().all(|e| !e.is_directory && e.kind == EntryKind::Track));
    }

    #[test]
    fn untitled_tracks_fall_back_to_file_name() {
        let catalog = FakeCatalog::default().with_track(5, "/m/untitled.ogg", None, 1);
        let entries = fetch_tracks(&catalog, 5, None, &CancellationToken::new())
            .unwrap()
            .unwrap();
        assert_eq!(names(&entries), vec!["untitled.ogg"]);
    }

    #[test]
    fn artist_tracks_survive_one_failing_album() {
        let artist = artist_path(42, "Daft Punk", "Artists");
        let catalog = FakeCatalog::default()
            .with_album(Some(42), 1, Some("A One"), 2)
            .with_album(Some(42), 2, Some("B Two"), 1)
            .with_album(Some(42), 3, Some("C Three"), 1)
            .with_track(1, "/m/1a.mp3", Some("1a"), 1)
            .with_track(1, "/m/1b.mp3", Some("1b"), 2)
            .with_track(2, "/m/2a.mp3", Some("2a"), 1)
            .with_track(3, "/m/3a.mp3", Some("3a"), 1)
            .failing_tracks_for(2);
        let listing = fetch_artist_tracks(&catalog, &labels(), 42, &artist, &CancellationToken::new())
            .unwrap()
            .unwrap();
        assert_eq!(names(&listing.entries), vec!["A One", "1a", "1b", "C Three", "3a"]);
        assert_eq!(listing.entries[0].kind, EntryKind::AlbumAsHeaderItem);
        assert_eq!(listing.entries[3].kind, EntryKind::AlbumAsHeaderItem);
        assert_eq!(
            listing.entries[0].path,
            "@/42/1*Artists\u{1A}Daft Punk\u{1A}A One"
        );
        assert_eq!(listing.suppressed_errors, 1);
        assert!(listing.sections.is_none());
    }

    #[test]
    fn artist_tracks_report_error_when_nothing_was_collected() {
        let artist = artist_path(42, "Daft Punk", "Artists");
        let catalog = FakeCatalog::default()
            .with_album(Some(42), 1, Some("Only"), 1)
            .failing_tracks_for(1);
        let result = fetch_artist_tracks(&catalog, &labels(), 42, &artist, &CancellationToken::new());
        assert!(matches!(
            result,
            Err(BrowseError::PartialCatalog { failed_albums: 1, .. })
        ));
    }

    #[test]
    fn artist_without_tracks_is_empty_not_failed() {
        let artist = artist_path(42, "Daft Punk", "Artists");
        let catalog = FakeCatalog::default().with_album(Some(42), 1, Some("Empty"), 0);
        let listing = fetch_artist_tracks(&catalog, &labels(), 42, &artist, &CancellationToken::new())
            .unwrap()
            .unwrap();
        assert!(listing.is_empty());
    }

    #[test]
    fn cancel_between_albums_stops_artist_tracks() {
        let artist = artist_path(42, "Daft Punk", "Artists");
        let token = CancellationToken::new();
        let hook_token = token.clone();
        let queried = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let hook_queried = queried.clone();
        let catalog = FakeCatalog::default()
            .with_album(Some(42), 1, Some("A One"), 1)
            .with_album(Some(42), 2, Some("B Two"), 1)
            .with_album(Some(42), 3, Some("C Three"), 1)
            .with_track(1, "/m/1a.mp3", Some("1a"), 1)
            .with_track(2, "/m/2a.mp3", Some("2a"), 1)
            .with_track(3, "/m/3a.mp3", Some("3a"), 1)
            .on_tracks(move |album_id| {
                hook_queried.lock().push(album_id);
                if album_id == 2 {
                    hook_token.cancel();
                }
            });

        let result = fetch_artist_tracks(&catalog, &labels(), 42, &artist, &token).unwrap();
        assert!(result.is_none());
        assert_eq!(*queried.lock(), vec![1, 2]);
    }

    #[test]
    fn cancelled_row_iteration_returns_none() {
        let catalog = FakeCatalog::default().with_artist(1, Some("A"), 1, 1);
        let token = CancellationToken::new();
        token.cancel();
        assert!(fetch_artists(&catalog, &labels(), &token).unwrap().is_none());
    }
}
