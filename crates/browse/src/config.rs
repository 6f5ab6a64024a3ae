//! Enumerator configuration: localized labels, recognized extensions and
//! optional root-listing extras.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BrowseError, Result};

/// Extensions recognized during filesystem walks.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".aac", ".mp3", ".wav", ".flac", ".ogg"];

/// Localized strings supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub unknown_artist: String,
    pub artists: String,
    pub albums: String,
    pub music: String,
    pub downloads: String,
    pub internal_storage: String,
    pub external_storage: String,
    pub usb_storage: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            unknown_artist: "(Unknown Artist)".to_string(),
            artists: "Artists".to_string(),
            albums: "Albums".to_string(),
            music: "Music".to_string(),
            downloads: "Downloads".to_string(),
            internal_storage: "Internal Storage".to_string(),
            external_storage: "External Storage".to_string(),
            usb_storage: "USB Storage".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    pub labels: Labels,
    pub supported_extensions: Vec<String>,
    /// Append artist/album catalog shortcuts to the root listing.
    pub catalog_shortcuts: bool,
    /// Directories appended to the root listing as favorites.
    pub favorites: Vec<PathBuf>,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            labels: Labels::default(),
            supported_extensions: DEFAULT_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            catalog_shortcuts: false,
            favorites: Vec::new(),
        }
    }
}

impl BrowseConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|error| BrowseError::Config(format!("invalid browse config: {error}")))
    }

    /// Builds the read-only extension set shared by every job.
    pub fn extension_set(&self) -> SupportedExtensions {
        SupportedExtensions::new(self.supported_extensions.iter().map(String::as_str))
    }
}

/// Case-insensitive set of recognized file extensions.
#[derive(Debug, Clone, Default)]
pub struct SupportedExtensions {
    extensions: HashSet<String>,
}

impl SupportedExtensions {
    /// Normalizes every extension to lowercase with a leading dot.
    pub fn new<'a>(extensions: impl IntoIterator<Item = &'a str>) -> Self {
        let extensions = extensions
            .into_iter()
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                let lower = ext.to_lowercase();
                if lower.starts_with('.') {
                    lower
                } else {
                    format!(".{lower}")
                }
            })
            .collect();
        Self { extensions }
    }

    /// Returns true if the file name ends with a recognized extension.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|name| name.to_string_lossy()) else {
            return false;
        };
        match name.rfind('.') {
            Some(dot) => self.extensions.contains(&name[dot..].to_lowercase()),
            None => false,
        }
    }
}
