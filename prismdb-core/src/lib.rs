//! # PrismDB Core
//!
//! Core library for PrismDB: exact nearest-neighbor search over multimodal
//! embeddings, with metadata kept in lockstep with the vectors.
//!
//! Image and text encoders live outside this crate. They hand fixed-length
//! `f32` vectors to the [`FusionCombiner`], whose output is stored in an
//! [`IndexedCollection`] together with a [`Payload`] describing the item.
//!
//! ## Crate Features
//!
//! - `async` - Enables [`AsyncCollection`] for tokio-compatible async operations
//!
//! ## Core Types
//!
//! ### Indexing
//!
//! - [`VectorIndex`] - Contract for nearest-neighbor indexes
//! - [`BruteForceIndex`] - Exact search by squared Euclidean distance
//! - [`MetadataStore`] - ID to metadata record mapping
//! - [`IndexedCollection`] - Index + metadata under one lock and one ID counter
//!
//! ### Ingestion
//!
//! - [`FusionCombiner`] - Weighted late fusion of image and text embeddings
//! - [`IndexingPipeline`] - Encode, fuse and add a whole dataset, then save
//!
//! ### Persistence
//!
//! - [`Snapshot`] - Checksummed on-disk snapshot with an atomic commit point
//!
//! ### Types
//!
//! - [`Vector`] - Owned vector data
//! - [`VectorId`] - Sequential entry identifier (u64)
//! - [`Payload`] / [`Value`] - Structured metadata

pub mod collection;
pub mod distance;
pub mod error;
pub mod fusion;
pub mod index;
pub mod metadata;
pub mod payload;
pub mod pipeline;
pub mod storage;
pub mod vector;

// Re-exports for convenient access
#[cfg(feature = "async")]
pub use collection::AsyncCollection;
pub use collection::{CollectionConfig, IndexedCollection, SearchResult, DEFAULT_DIMENSION};
pub use distance::distance_to_score;
pub use error::{Error, Result};
pub use fusion::{FusionCombiner, DEFAULT_ALPHA};
pub use index::{BruteForceIndex, VectorIndex};
pub use metadata::MetadataStore;
pub use payload::{Payload, Value};
pub use pipeline::{
    DatasetRecord, ImageEncoder, IndexingPipeline, IndexingStats, PipelineConfig, TextEncoder,
};
pub use storage::Snapshot;
pub use vector::{Vector, VectorId};

/// Re-export commonly used types for convenience.
///
/// # Example
///
/// ```rust
/// use prismdb_core::prelude::*;
///
/// let collection = IndexedCollection::new(CollectionConfig::new(3)).unwrap();
/// let payload = Payload::new().with_field("text", "blue denim jacket");
/// let id = collection.add([1.0, 2.0, 3.0], payload).unwrap();
/// assert_eq!(id, 0);
/// ```
pub mod prelude {
    pub use crate::{
        BruteForceIndex, CollectionConfig, Error, FusionCombiner, ImageEncoder,
        IndexedCollection, IndexingPipeline, Payload, PipelineConfig, Result, SearchResult,
        TextEncoder, Value, Vector, VectorId, VectorIndex,
    };
}
