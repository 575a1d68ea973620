//! Storage module for on-disk snapshots.
//!
//! This module provides:
//! - The snapshot manifest (`metadata.json`), which is the commit point
//! - Generation-named vector data files
//! - Atomic file replacement (write to temp, fsync, rename)

pub mod snapshot;

pub use snapshot::{Snapshot, SnapshotManifest, MANIFEST_FILE};
