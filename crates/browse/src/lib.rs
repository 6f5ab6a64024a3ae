//! Media browsing library.
//!
//! This crate lists one unified namespace for a music player:
//! - Storage roots discovered from the platform and its mount table
//! - Filesystem directories, optionally walked recursively
//! - Virtual artist and album listings answered by a media catalog
//! - Sorted listings with a letter jump index
//!
//! Every listing runs as a cancellable job on its own worker thread; a
//! [`Browser`] keeps one current job per caller and drops stale results.

pub mod cancel;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod job;
pub mod order;
pub mod path;
pub mod sections;
pub mod session;
pub mod storage;
pub mod types;
pub mod walk;

#[cfg(test)]
mod testing;

// Re-export main types
pub use cancel::{CancellationToken, VersionTracker};
pub use catalog::{AlbumRow, ArtistRow, MediaCatalog, TrackRow};
pub use config::{BrowseConfig, Labels};
pub use engine::{EnumerationRequest, Enumerator};
pub use error::{BrowseError, Result};
pub use job::{JobHandle, JobMessage, JobOutcome, JobReceiver, JobState};
pub use path::BrowsePath;
pub use session::{Browser, Delivery, Session};
pub use storage::{StoragePlatform, SystemPlatform};
pub use types::{Entry, EntryKind, Listing, Section};
