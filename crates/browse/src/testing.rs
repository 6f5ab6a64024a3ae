//! Test doubles for the catalog and platform collaborators.

use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::{AlbumRow, ArtistRow, MediaCatalog, TrackRow};
use crate::error::{BrowseError, Result};
use crate::storage::StoragePlatform;

/// Called with the album id before each tracks query.
type TracksHook = Arc<dyn Fn(i64) + Send + Sync>;

#[derive(Default)]
pub struct FakeCatalog {
    artists: Vec<ArtistRow>,
    albums: Vec<(Option<i64>, AlbumRow)>,
    tracks: Vec<(i64, TrackRow)>,
    failing_albums: HashSet<i64>,
    no_row_sets: bool,
    on_tracks: Option<TracksHook>,
}

impl FakeCatalog {
    pub fn with_artist(mut self, id: i64, name: Option<&str>, albums: i32, tracks: i32) -> Self {
        self.artists.push(ArtistRow {
            id,
            name: name.map(str::to_string),
            album_count: albums,
            track_count: tracks,
        });
        self
    }

    pub fn with_album(
        mut self,
        artist: Option<i64>,
        id: i64,
        name: Option<&str>,
        tracks: i32,
    ) -> Self {
        self.albums.push((
            artist,
            AlbumRow {
                id,
                name: name.map(str::to_string),
                track_count: tracks,
            },
        ));
        self
    }

    pub fn with_track(mut self, album: i64, path: &str, title: Option<&str>, number: i32) -> Self {
        self.tracks.push((
            album,
            TrackRow {
                path: path.to_string(),
                title: title.map(str::to_string),
                track_number: number,
            },
        ));
        self
    }

    pub fn failing_tracks_for(mut self, album: i64) -> Self {
        self.failing_albums.insert(album);
        self
    }

    pub fn on_tracks(mut self, hook: impl Fn(i64) + Send + Sync + 'static) -> Self {
        self.on_tracks = Some(Arc::new(hook));
        self
    }

    pub fn without_row_sets(mut self) -> Self {
        self.no_row_sets = true;
        self
    }
}

impl MediaCatalog for FakeCatalog {
    fn artists(&self) -> Result<Option<Vec<ArtistRow>>> {
        if self.no_row_sets {
            return Ok(None);
        }
        Ok(Some(self.artists.clone()))
    }

    fn albums(&self, artist_id: Option<i64>) -> Result<Option<Vec<AlbumRow>>> {
        if self.no_row_sets {
            return Ok(None);
        }
        Ok(Some(
            self.albums
                .iter()
                .filter(|(artist, _)| artist_id.is_none() || *artist == artist_id)
                .map(|(_, row)| row.clone())
                .collect(),
        ))
    }

    fn tracks(&self, album_id: i64, _artist_id: Option<i64>) -> Result<Option<Vec<TrackRow>>> {
        if let Some(hook) = &self.on_tracks {
            hook(album_id);
        }
        if self.no_row_sets {
            return Ok(None);
        }
        if self.failing_albums.contains(&album_id) {
            return Err(BrowseError::CatalogQuery(format!(
                "tracks of album {album_id} unavailable"
            )));
        }
        Ok(Some(
            self.tracks
                .iter()
                .filter(|(album, _)| *album == album_id)
                .map(|(_, row)| row.clone())
                .collect(),
        ))
    }
}

#[derive(Debug, Default)]
pub struct FakePlatform {
    pub music: Option<PathBuf>,
    pub downloads: Option<PathBuf>,
    pub primary: Option<PathBuf>,
    pub primary_removable: bool,
    /// `None` makes the mount table unreadable.
    pub mount_table: Option<String>,
    pub app_dirs: Vec<PathBuf>,
}

impl StoragePlatform for FakePlatform {
    fn music_dir(&self) -> Option<PathBuf> {
        self.music.clone()
    }

    fn downloads_dir(&self) -> Option<PathBuf> {
        self.downloads.clone()
    }

    fn primary_storage(&self) -> Option<PathBuf> {
        self.primary.clone()
    }

    fn is_primary_removable(&self) -> bool {
        self.primary_removable
    }

    fn read_mount_table(&self) -> io::Result<String> {
        self.mount_table
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no mount table"))
    }

    fn app_external_dirs(&self) -> Vec<PathBuf> {
        self.app_dirs.clone()
    }
}
