//! Snapshot files: one manifest plus one vector data file per generation.
//!
//! A snapshot directory holds:
//! ```text
//! metadata.json        manifest: counters, vector file name + crc32, metadata records
//! vectors-<gen>.bin    vector data written by the index
//! ```
//!
//! `metadata.json` is the commit point. A save writes the new vector file
//! under a fresh generation name, then atomically replaces the manifest.
//! Until that rename lands, the old manifest still names the old vector
//! file, so a crash at any step leaves the previous snapshot readable.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::metadata::MetadataStore;
use crate::vector::VectorId;

/// Name of the manifest file inside a snapshot directory.
pub const MANIFEST_FILE: &str = "metadata.json";

/// Current manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

const VECTOR_FILE_PREFIX: &str = "vectors-";
const VECTOR_FILE_SUFFIX: &str = ".bin";
const TEMP_SUFFIX: &str = ".tmp";

/// The manifest stored in `metadata.json`.
///
/// `M` is the metadata representation: owned when reading, borrowed when
/// writing so a save does not clone every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotManifest<M = MetadataStore> {
    pub format_version: u32,
    pub dimension: usize,
    pub next_id: VectorId,
    pub vector_count: u64,
    pub generation: u64,
    pub vector_file: String,
    pub vector_crc32: u32,
    pub metadata: M,
}

/// A snapshot read back from disk.
///
/// The vector file has passed its checksum against the manifest; cross
/// checks between counters are left to the caller.
pub struct Snapshot {
    pub manifest: SnapshotManifest,
    pub vector_data: Mmap,
}

impl Snapshot {
    /// Returns true if `dir` contains a committed snapshot.
    pub fn exists<P: AsRef<Path>>(dir: P) -> bool {
        dir.as_ref().join(MANIFEST_FILE).is_file()
    }

    /// Reads the snapshot committed in `dir`.
    ///
    /// # Errors
    ///
    /// - [`Error::IoError`] if the manifest cannot be read.
    /// - [`Error::CorruptSnapshot`] if the manifest does not parse, has an
    ///   unknown version, names a missing vector file, or the vector file
    ///   fails its checksum.
    pub fn read<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let manifest_bytes = fs::read(dir.join(MANIFEST_FILE))
            .map_err(|e| Error::IoError(format!("read manifest failed: {}", e)))?;
        let manifest: SnapshotManifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|e| Error::CorruptSnapshot(format!("parse manifest failed: {}", e)))?;

        if manifest.format_version != MANIFEST_VERSION {
            return Err(Error::CorruptSnapshot(format!(
                "unsupported manifest version: {}",
                manifest.format_version
            )));
        }

        if parse_generation(&manifest.vector_file).is_none() {
            return Err(Error::CorruptSnapshot(format!(
                "invalid vector file name: {}",
                manifest.vector_file
            )));
        }

        let vector_path = dir.join(&manifest.vector_file);
        let file = File::open(&vector_path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::CorruptSnapshot(format!(
                "vector file {} named by manifest is missing",
                manifest.vector_file
            )),
            _ => Error::IoError(format!("open vector file failed: {}", e)),
        })?;

        // SAFETY: vector files are never modified after their rename; a new
        // save always writes a new generation file.
        let vector_data = unsafe { Mmap::map(&file) }
            .map_err(|e| Error::IoError(format!("mmap vector file failed: {}", e)))?;

        let actual_crc = crc32fast::hash(&vector_data);
        if actual_crc != manifest.vector_crc32 {
            return Err(Error::CorruptSnapshot(format!(
                "vector file checksum mismatch: manifest {}, file {}",
                manifest.vector_crc32, actual_crc
            )));
        }

        debug!(
            dir = %dir.display(),
            generation = manifest.generation,
            vector_count = manifest.vector_count,
            "snapshot read"
        );

        Ok(Self {
            manifest,
            vector_data,
        })
    }

    /// Commits a new snapshot to `dir` and returns its generation.
    ///
    /// On error the previously committed snapshot, if any, is left intact.
    pub fn write<P: AsRef<Path>>(
        dir: P,
        dimension: usize,
        next_id: VectorId,
        vector_count: u64,
        vector_data: &[u8],
        metadata: &MetadataStore,
    ) -> Result<u64> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .map_err(|e| Error::IoError(format!("create snapshot dir failed: {}", e)))?;

        let generation = latest_generation(dir)?.map_or(0, |g| g + 1);
        let vector_file = vector_file_name(generation);

        write_atomic(&dir.join(&vector_file), vector_data)?;

        let manifest = SnapshotManifest {
            format_version: MANIFEST_VERSION,
            dimension,
            next_id,
            vector_count,
            generation,
            vector_file,
            vector_crc32: crc32fast::hash(vector_data),
            metadata,
        };
        let manifest_bytes = serde_json::to_vec(&manifest)
            .map_err(|e| Error::IoError(format!("serialize manifest failed: {}", e)))?;

        write_atomic(&dir.join(MANIFEST_FILE), &manifest_bytes)?;
        sync_dir(dir)?;

        remove_stale_files(dir, generation);

        Ok(generation)
    }
}

fn vector_file_name(generation: u64) -> String {
    format!("{}{}{}", VECTOR_FILE_PREFIX, generation, VECTOR_FILE_SUFFIX)
}

fn parse_generation(file_name: &str) -> Option<u64> {
    file_name
        .strip_prefix(VECTOR_FILE_PREFIX)?
        .strip_suffix(VECTOR_FILE_SUFFIX)?
        .parse()
        .ok()
}

/// Highest generation of any vector file in `dir`, committed or not.
fn latest_generation(dir: &Path) -> Result<Option<u64>> {
    let entries =
        fs::read_dir(dir).map_err(|e| Error::IoError(format!("read snapshot dir failed: {}", e)))?;

    let mut latest = None;
    for entry in entries {
        let entry = entry.map_err(|e| Error::IoError(format!("read dir entry failed: {}", e)))?;
        if let Some(generation) = entry.file_name().to_str().and_then(parse_generation) {
            latest = latest.max(Some(generation));
        }
    }
    Ok(latest)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

/// Replaces `path` with `bytes` via a synced temp file and a rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_path(path);

    let result = (|| -> io::Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    result.map_err(|e| {
        let _ = fs::remove_file(&tmp);
        Error::IoError(format!("write {} failed: {}", path.display(), e))
    })
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| Error::IoError(format!("sync snapshot dir failed: {}", e)))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

/// Best-effort removal of vector files from other generations and of
/// leftover temp files. Failures only cost disk space.
fn remove_stale_files(dir: &Path, keep_generation: u64) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };

        let stale = match parse_generation(name) {
            Some(generation) => generation != keep_generation,
            None => name.ends_with(TEMP_SUFFIX),
        };

        if stale {
            if let Err(e) = fs::remove_file(entry.path()) {
                warn!(file = name, error = %e, "failed to remove stale snapshot file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Payload;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_snapshot_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("prismdb_test_snapshot")
            .join(format!("snap_{}_{}", std::process::id(), id));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn sample_metadata() -> MetadataStore {
        let mut store = MetadataStore::new();
        store
            .insert(0, Payload::new().with_field("text", "a"))
            .unwrap();
        store
    }

    #[test]
    fn test_write_and_read() {
        let dir = temp_snapshot_dir();
        let metadata = sample_metadata();

        let generation = Snapshot::write(&dir, 4, 1, 1, b"vector-bytes", &metadata).unwrap();
        assert_eq!(generation, 0);
        assert!(Snapshot::exists(&dir));

        let snapshot = Snapshot::read(&dir).unwrap();
        assert_eq!(&snapshot.vector_data[..], b"vector-bytes");
        assert_eq!(snapshot.manifest.dimension, 4);
        assert_eq!(snapshot.manifest.next_id, 1);
        assert_eq!(snapshot.manifest.vector_file, "vectors-0.bin");
        assert_eq!(snapshot.manifest.metadata, metadata);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_rewrite_bumps_generation_and_removes_old_file() {
        let dir = temp_snapshot_dir();
        let metadata = sample_metadata();

        Snapshot::write(&dir, 4, 1, 1, b"first", &metadata).unwrap();
        let generation = Snapshot::write(&dir, 4, 1, 1, b"second", &metadata).unwrap();
        assert_eq!(generation, 1);

        assert!(!dir.join("vectors-0.bin").exists());
        assert!(dir.join("vectors-1.bin").exists());
        assert_eq!(&Snapshot::read(&dir).unwrap().vector_data[..], b"second");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_uncommitted_vector_file_is_ignored() {
        let dir = temp_snapshot_dir();
        let metadata = sample_metadata();
        Snapshot::write(&dir, 4, 1, 1, b"committed", &metadata).unwrap();

        // A crash after the vector rename but before the manifest rename.
        fs::write(dir.join("vectors-7.bin"), b"orphan").unwrap();
        fs::write(dir.join("metadata.json.tmp"), b"{half").unwrap();

        assert_eq!(&Snapshot::read(&dir).unwrap().vector_data[..], b"committed");

        let generation = Snapshot::write(&dir, 4, 1, 1, b"next", &metadata).unwrap();
        assert_eq!(generation, 8);
        assert!(!dir.join("vectors-7.bin").exists());
        assert!(!dir.join("metadata.json.tmp").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_checksum_mismatch() {
        let dir = temp_snapshot_dir();
        Snapshot::write(&dir, 4, 1, 1, b"payload", &sample_metadata()).unwrap();
        fs::write(dir.join("vectors-0.bin"), b"tampered").unwrap();

        let result = Snapshot::read(&dir);
        assert!(matches!(result, Err(Error::CorruptSnapshot(_))));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_vector_file() {
        let dir = temp_snapshot_dir();
        Snapshot::write(&dir, 4, 1, 1, b"payload", &sample_metadata()).unwrap();
        fs::remove_file(dir.join("vectors-0.bin")).unwrap();

        let result = Snapshot::read(&dir);
        assert!(matches!(result, Err(Error::CorruptSnapshot(_))));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_read_without_snapshot() {
        let dir = temp_snapshot_dir();
        assert!(!Snapshot::exists(&dir));
        assert!(matches!(Snapshot::read(&dir), Err(Error::IoError(_))));
    }

    #[test]
    fn test_parse_generation() {
        assert_eq!(parse_generation("vectors-12.bin"), Some(12));
        assert_eq!(parse_generation("vectors-.bin"), None);
        assert_eq!(parse_generation("vectors-3.bin.tmp"), None);
        assert_eq!(parse_generation("metadata.json"), None);
    }
}
