use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    #[error("unable to list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mount table read failed: {0}")]
    MountTable(#[source] std::io::Error),

    #[error("catalog query failed: {0}")]
    CatalogQuery(String),

    #[error("catalog query failed for {failed_albums} album(s): {source}")]
    PartialCatalog {
        failed_albums: usize,
        #[source]
        source: Box<BrowseError>,
    },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("unable to start enumeration worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, BrowseError>;

impl BrowseError {
    /// Wraps an I/O error raised while listing `path`.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Canonicalizes a path, returning the original if canonicalization fails.
pub fn canonicalize_existing_path(path: PathBuf) -> PathBuf {
    fs::canonicalize(&path).unwrap_or(path)
}
