//! # PrismDB
//!
//! **Exact multimodal embedding search with metadata kept in lockstep.**
//!
//! PrismDB stores fused image/text embeddings for a product catalog and
//! answers "which stored items are closest to this query" by exact
//! squared-Euclidean nearest-neighbor search. Every stored vector has a
//! metadata record under the same sequential identifier, and both halves
//! are persisted together as one snapshot.
//!
//! ## Quick Start
//!
//! ```rust
//! use prismdb::prelude::*;
//!
//! let collection = IndexedCollection::new(CollectionConfig::new(3)).unwrap();
//!
//! collection
//!     .add([1.0, 0.0, 0.0], Payload::new().with_field("text", "red dress"))
//!     .unwrap();
//! collection
//!     .add([0.0, 1.0, 0.0], Payload::new().with_field("text", "blue jeans"))
//!     .unwrap();
//!
//! let results = collection.search(&[0.9, 0.1, 0.0], 1).unwrap();
//! assert_eq!(results[0].id, 0);
//! assert_eq!(results[0].payload.get_str("text"), Some("red dress"));
//! ```
//!
//! ### Fusing Modalities
//!
//! A query may carry an image, a description, or both:
//!
//! ```rust
//! use prismdb::prelude::*;
//!
//! let fusion = FusionCombiner::new(0.5, 2).unwrap();
//! let query = fusion.combine(Some(&[1.0, 0.0][..]), Some(&[0.0, 1.0][..])).unwrap();
//! assert_eq!(query.as_slice(), &[0.5, 0.5]);
//! ```
//!
//! ### Persistence
//!
//! ```no_run
//! use prismdb::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let collection = IndexedCollection::open_or_create("./vector_store", CollectionConfig::default())?;
//!     collection.add(vec![0.1; 768], Payload::new().with_field("text", "example"))?;
//!     collection.save("./vector_store")?;
//!
//!     let reloaded = IndexedCollection::load("./vector_store")?;
//!     assert_eq!(reloaded.len(), collection.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Crate Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `async` | Enables `AsyncCollection` for tokio compatibility |
//!
//! ## Architecture
//!
//! - **`prismdb-core`** - Index, metadata, fusion, pipeline and snapshot code
//! - **`prismdb`** - Re-exports everything from the core crate
//!
//! ## Thread Safety
//!
//! - [`BruteForceIndex`] and [`MetadataStore`] are plain values; use external synchronization
//! - [`IndexedCollection`] guards both behind a single `RwLock`
//! - `AsyncCollection` is `Clone` and safe to share across tasks

pub use prismdb_core::*;
