//! Storage root discovery.
//!
//! The root listing is built from three sources, in order:
//! 1. The primary storage root reported by the platform
//! 2. Mount table entries that look like removable or FUSE volumes
//! 3. Volume roots recovered from per-app external directories
//!
//! Every candidate is canonicalized and deduplicated case-insensitively, so a
//! volume exposed under several mount points shows up once.

mod mounts;
mod platform;
mod roots;

pub use mounts::{parse_line, MountTable, StorageRootCandidate, MAX_MOUNT_HOPS};
pub use platform::{StoragePlatform, SystemPlatform};
pub use roots::{discover_storage_roots, MAX_CANONICALIZE_PASSES, MAX_STORAGE_ROOTS};
