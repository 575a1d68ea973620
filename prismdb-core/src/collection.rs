//! Indexed collection: vectors and metadata under one identifier space.
//!
//! An `IndexedCollection` combines:
//! - A [`BruteForceIndex`] holding the vectors
//! - A [`MetadataStore`] holding one record per vector
//! - The single `next_id` counter both are keyed by
//!
//! All three live behind one reader-writer lock, so a search never sees a
//! vector whose metadata has not been inserted yet.

use std::path::Path;

use parking_lot::RwLock;
use tracing::{debug, error, info};

use crate::distance::distance_to_score;
use crate::error::{Error, Result};
use crate::index::{BruteForceIndex, VectorIndex};
use crate::metadata::MetadataStore;
use crate::payload::Payload;
use crate::storage::snapshot::{Snapshot, SnapshotManifest};
use crate::vector::{check_finite, Vector, VectorId};

/// Embedding dimension of the default image and text encoders.
pub const DEFAULT_DIMENSION: usize = 768;

/// Configuration for a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionConfig {
    /// Dimensionality of vectors.
    pub dimension: usize,
}

impl CollectionConfig {
    /// Creates a new config with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Sets the dimension. Chainable.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

/// A single search hit joined with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The ID of the matched entry.
    pub id: VectorId,
    /// Squared Euclidean distance from the query (lower = more similar).
    pub distance: f32,
    /// The metadata stored with this entry.
    pub payload: Payload,
}

impl SearchResult {
    /// Similarity in `(0, 1]`, computed as `1 / (1 + distance)`.
    #[inline]
    pub fn score(&self) -> f32 {
        distance_to_score(self.distance)
    }
}

struct Inner {
    index: BruteForceIndex,
    metadata: MetadataStore,
    next_id: VectorId,
}

/// Vectors plus metadata, added and searched as one unit.
///
/// The collection is `Send + Sync`; share it with `Arc`. Searches run
/// concurrently, adds and saves are exclusive.
///
/// # Example
///
/// ```
/// use prismdb_core::{CollectionConfig, IndexedCollection, Payload};
///
/// let collection = IndexedCollection::new(CollectionConfig::new(4)).unwrap();
/// let a = collection
///     .add([1.0, 0.0, 0.0, 0.0], Payload::new().with_field("text", "a"))
///     .unwrap();
/// let b = collection
///     .add([0.0, 1.0, 0.0, 0.0], Payload::new().with_field("text", "b"))
///     .unwrap();
/// assert_eq!((a, b), (0, 1));
///
/// let results = collection.search(&[1.0, 0.0, 0.0, 0.0], 2).unwrap();
/// assert_eq!(results[0].id, 0);
/// assert_eq!(results[0].distance, 0.0);
/// assert_eq!(results[1].distance, 2.0);
/// assert_eq!(results[1].payload.get_str("text"), Some("b"));
/// ```
pub struct IndexedCollection {
    config: CollectionConfig,
    inner: RwLock<Inner>,
}

impl IndexedCollection {
    /// Creates an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the configured dimension is 0.
    pub fn new(config: CollectionConfig) -> Result<Self> {
        if config.dimension == 0 {
            return Err(Error::InvalidInput(
                "collection dimension must be non-zero".into(),
            ));
        }

        let inner = Inner {
            index: BruteForceIndex::with_dimension(config.dimension)?,
            metadata: MetadataStore::new(),
            next_id: 0,
        };

        Ok(Self {
            config,
            inner: RwLock::new(inner),
        })
    }

    /// Loads the snapshot in `dir` if there is one, otherwise creates an
    /// empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the snapshot's dimension differs
    /// from the config, plus any error of [`IndexedCollection::load`].
    pub fn open_or_create<P: AsRef<Path>>(dir: P, config: CollectionConfig) -> Result<Self> {
        let dir = dir.as_ref();

        if !Snapshot::exists(dir) {
            debug!(dir = %dir.display(), "no snapshot found, starting empty");
            return Self::new(config);
        }

        let collection = Self::load(dir)?;
        if collection.dimension() != config.dimension {
            return Err(Error::InvalidInput(format!(
                "snapshot dimension {} does not match configured dimension {}",
                collection.dimension(),
                config.dimension
            )));
        }
        Ok(collection)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Returns the dimension of vectors in this collection.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.inner.read().index.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the ID the next add will receive.
    pub fn next_id(&self) -> VectorId {
        self.inner.read().next_id
    }

    /// Adds a vector with its metadata and returns the assigned ID.
    ///
    /// Either both the vector and the metadata are stored, or neither is.
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if the vector has the wrong length.
    /// - [`Error::InvalidInput`] if the vector or the payload holds a NaN or
    ///   infinite number.
    /// - [`Error::DuplicateId`] or [`Error::InternalConsistency`] if the
    ///   index and metadata counters disagree; nothing is stored.
    pub fn add<V: AsRef<[f32]>>(&self, vector: V, payload: Payload) -> Result<VectorId> {
        let vector = vector.as_ref();
        self.check_dimension(vector.len())?;
        check_finite(vector)?;
        payload.check_finite()?;

        let mut inner = self.inner.write();
        let id = inner.next_id;

        if inner.metadata.contains(id) {
            error!(id, "metadata already holds a record for the next id");
            return Err(Error::DuplicateId(id));
        }

        let assigned = inner.index.add(vector)?;
        if assigned != id {
            inner.index.truncate(assigned as usize);
            error!(id, assigned, "index assigned an unexpected id");
            return Err(Error::InternalConsistency(format!(
                "index assigned id {} but collection expected {}",
                assigned, id
            )));
        }

        if let Err(e) = inner.metadata.insert(id, payload) {
            inner.index.truncate(assigned as usize);
            return Err(e);
        }

        inner.next_id += 1;
        debug!(id, "entry added");
        Ok(id)
    }

    /// Searches for the `k` entries closest to `query`.
    ///
    /// Results are ordered by ascending distance, ties by ascending ID.
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if the query has the wrong length.
    /// - [`Error::InternalConsistency`] if a hit has no metadata record.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        self.check_dimension(query.len())?;

        let inner = self.inner.read();
        let hits = inner.index.search(query, k)?;

        hits.into_iter()
            .map(|(id, distance)| {
                let payload = inner.metadata.get(id).map_err(|_| {
                    error!(id, "search hit has no metadata record");
                    Error::InternalConsistency(format!(
                        "id {} is in the index but missing from metadata",
                        id
                    ))
                })?;

                Ok(SearchResult {
                    id,
                    distance,
                    payload: payload.clone(),
                })
            })
            .collect()
    }

    /// Gets an entry's vector and metadata by ID.
    pub fn get(&self, id: VectorId) -> Result<(Vector, Payload)> {
        let inner = self.inner.read();
        let payload = inner.metadata.get(id)?.clone();
        let vector = inner.index.get(id).map(Vector::new).ok_or_else(|| {
            error!(id, "metadata record has no vector");
            Error::InternalConsistency(format!(
                "id {} is in metadata but missing from the index",
                id
            ))
        })?;
        Ok((vector, payload))
    }

    /// Writes a snapshot of the collection to `dir`.
    ///
    /// Adds are blocked while the snapshot is written, so it reflects one
    /// consistent state. On error the previous snapshot in `dir` is kept.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        let inner = self.inner.write();

        let vector_data = inner.index.to_bytes()?;
        let generation = Snapshot::write(
            dir,
            self.config.dimension,
            inner.next_id,
            inner.index.len() as u64,
            &vector_data,
            &inner.metadata,
        )?;

        info!(
            dir = %dir.display(),
            generation,
            entries = inner.index.len(),
            "collection saved"
        );
        Ok(())
    }

    /// Loads the snapshot committed in `dir`.
    ///
    /// # Errors
    ///
    /// - [`Error::IoError`] if the snapshot cannot be read.
    /// - [`Error::CorruptSnapshot`] if the files fail their checksums or the
    ///   dimension, counter, vector count and metadata count disagree.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let snapshot = Snapshot::read(dir)?;
        let index = BruteForceIndex::from_bytes(&snapshot.vector_data)?;
        let manifest = snapshot.manifest;

        validate_snapshot(&manifest, &index)?;

        info!(
            dir = %dir.display(),
            generation = manifest.generation,
            entries = index.len(),
            "collection loaded"
        );

        let inner = Inner {
            index,
            metadata: manifest.metadata,
            next_id: manifest.next_id,
        };

        Ok(Self {
            config: CollectionConfig::new(manifest.dimension),
            inner: RwLock::new(inner),
        })
    }

    fn check_dimension(&self, got: usize) -> Result<()> {
        if got != self.config.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.config.dimension,
                got,
            });
        }
        Ok(())
    }
}

/// Cross-checks the manifest counters against the decoded index.
fn validate_snapshot(manifest: &SnapshotManifest, index: &BruteForceIndex) -> Result<()> {
    if index.dimension() != manifest.dimension {
        return Err(Error::CorruptSnapshot(format!(
            "manifest dimension {} but vector data dimension {}",
            manifest.dimension,
            index.dimension()
        )));
    }

    let count = index.len() as u64;
    if count != manifest.vector_count {
        return Err(Error::CorruptSnapshot(format!(
            "manifest declares {} vectors but vector data holds {}",
            manifest.vector_count, count
        )));
    }

    if manifest.metadata.len() as u64 != count {
        return Err(Error::CorruptSnapshot(format!(
            "{} metadata records for {} vectors",
            manifest.metadata.len(),
            count
        )));
    }

    if manifest.next_id != count {
        return Err(Error::CorruptSnapshot(format!(
            "next id {} does not follow {} stored entries",
            manifest.next_id, count
        )));
    }

    // Ids are dense: record n must have id n.
    if let Some((pos, id)) = manifest
        .metadata
        .ids()
        .enumerate()
        .find(|&(pos, id)| pos as u64 != id)
    {
        return Err(Error::CorruptSnapshot(format!(
            "metadata id {} found at position {}",
            id, pos
        )));
    }

    Ok(())
}

// Async API when tokio feature is enabled
#[cfg(feature = "async")]
mod async_api {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn join_error(e: tokio::task::JoinError) -> Error {
        Error::Runtime(format!("spawn_blocking failed: {}", e))
    }

    /// Async wrapper for IndexedCollection.
    ///
    /// Provides async versions of the collection methods using
    /// `spawn_blocking` so brute-force searches and snapshot I/O do not stall
    /// the async runtime.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use prismdb_core::{AsyncCollection, CollectionConfig, Payload};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let config = CollectionConfig::new(768);
    ///     let collection = AsyncCollection::open_or_create("./vector_store", config).await.unwrap();
    ///
    ///     collection.add(vec![0.1; 768], Payload::new()).await.unwrap();
    ///     let results = collection.search(&[0.1; 768], 10).await.unwrap();
    ///     collection.save("./vector_store").await.unwrap();
    /// }
    /// ```
    #[derive(Clone)]
    pub struct AsyncCollection {
        inner: Arc<IndexedCollection>,
    }

    impl AsyncCollection {
        /// Opens or creates a collection asynchronously.
        pub async fn open_or_create<P: AsRef<Path>>(
            dir: P,
            config: CollectionConfig,
        ) -> Result<Self> {
            let dir = dir.as_ref().to_path_buf();
            let collection = tokio::task::spawn_blocking(move || {
                IndexedCollection::open_or_create(dir, config)
            })
            .await
            .map_err(join_error)??;

            Ok(Self::from_sync(collection))
        }

        /// Loads a snapshot asynchronously.
        pub async fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
            let dir = dir.as_ref().to_path_buf();
            let collection = tokio::task::spawn_blocking(move || IndexedCollection::load(dir))
                .await
                .map_err(join_error)??;

            Ok(Self::from_sync(collection))
        }

        /// Wraps an existing collection in an async wrapper.
        pub fn from_sync(collection: IndexedCollection) -> Self {
            Self {
                inner: Arc::new(collection),
            }
        }

        /// Adds an entry asynchronously.
        pub async fn add(&self, vector: Vec<f32>, payload: Payload) -> Result<VectorId> {
            let inner = Arc::clone(&self.inner);
            tokio::task::spawn_blocking(move || inner.add(vector, payload))
                .await
                .map_err(join_error)?
        }

        /// Searches asynchronously.
        pub async fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
            let inner = Arc::clone(&self.inner);
            let query = query.to_vec();
            tokio::task::spawn_blocking(move || inner.search(&query, k))
                .await
                .map_err(join_error)?
        }

        /// Gets an entry by ID asynchronously.
        pub async fn get(&self, id: VectorId) -> Result<(Vector, Payload)> {
            let inner = Arc::clone(&self.inner);
            tokio::task::spawn_blocking(move || inner.get(id))
                .await
                .map_err(join_error)?
        }

        /// Saves a snapshot asynchronously.
        pub async fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
            let inner = Arc::clone(&self.inner);
            let dir: PathBuf = dir.as_ref().to_path_buf();
            tokio::task::spawn_blocking(move || inner.save(dir))
                .await
                .map_err(join_error)?
        }

        /// Returns the number of entries.
        pub fn len(&self) -> usize {
            self.inner.len()
        }

        /// Returns true if empty.
        pub fn is_empty(&self) -> bool {
            self.inner.is_empty()
        }

        /// Returns reference to inner sync collection.
        pub fn inner(&self) -> &IndexedCollection {
            &self.inner
        }
    }
}

#[cfg(feature = "async")]
pub use async_api::AsyncCollection;
