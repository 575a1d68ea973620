//! Nearest-neighbor index implementations.
//!
//! [`VectorIndex`] is the contract a collection relies on. The only
//! implementation is the exact [`BruteForceIndex`]; an approximate index can
//! replace it without changing how collections add, search or persist.

pub mod brute_force;

pub use brute_force::BruteForceIndex;

use crate::error::Result;
use crate::vector::VectorId;

/// An index over fixed-dimension vectors with sequential IDs.
///
/// IDs are positions: the n-th vector added gets ID `n - 1`. Implementations
/// must be safe to search from many threads at once; mutation goes through
/// `&mut self` and is serialized by the owner.
pub trait VectorIndex: Send + Sync {
    /// Creates an empty index for vectors of the given dimension.
    fn with_dimension(dimension: usize) -> Result<Self>
    where
        Self: Sized;

    /// Returns the dimension of vectors in this index.
    fn dimension(&self) -> usize;

    /// Returns the number of stored vectors.
    fn len(&self) -> usize;

    /// Returns true if no vectors are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a vector and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`](crate::Error::DimensionMismatch)
    /// if the vector length differs from the index dimension.
    fn add(&mut self, vector: &[f32]) -> Result<VectorId>;

    /// Returns up to `k` `(id, squared distance)` pairs closest to `query`.
    ///
    /// Results are ordered by ascending distance, ties by ascending ID. NaN
    /// distances come last.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(VectorId, f32)>>;

    /// Returns the stored vector for an ID.
    fn get(&self, id: VectorId) -> Option<&[f32]>;

    /// Drops every vector whose ID is `>= len`.
    fn truncate(&mut self, len: usize);

    /// Serializes all vectors and the insertion counter.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Restores an index produced by [`VectorIndex::to_bytes`].
    fn from_bytes(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized;
}
