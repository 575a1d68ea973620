//! Brute-force (flat) index for exact nearest neighbor search.
//!
//! This is the simplest index type that computes distances to all vectors
//! during search. While O(n * dimension) per query, it provides:
//! - 100% recall (exact results)
//! - Deterministic ordering, including ties
//! - A compact, checksummed on-disk form
//!
//! # Format
//!
//! Serialized indexes are little-endian:
//! ```text
//! [magic:"PRSV"][version:u32][dimension:u32][count:u64][vectors:f32*dimension*count][crc32:u32]
//! ```
//! The checksum covers every byte before it.

use std::cmp::Ordering;

use crate::distance::euclidean_distance_squared;
use crate::error::{Error, Result};
use crate::index::VectorIndex;
use crate::vector::VectorId;

const MAGIC: &[u8; 4] = b"PRSV";
const FORMAT_VERSION: u32 = 1;
/// magic + version + dimension + count
const HEADER_LEN: usize = 4 + 4 + 4 + 8;
const CHECKSUM_LEN: usize = 4;

/// Exact index over vectors stored contiguously in insertion order.
///
/// # Example
///
/// ```
/// use prismdb_core::{BruteForceIndex, VectorIndex};
///
/// let mut index = BruteForceIndex::new(3).unwrap();
/// let a = index.add(&[1.0, 0.0, 0.0]).unwrap();
/// let b = index.add(&[0.0, 1.0, 0.0]).unwrap();
/// assert_eq!((a, b), (0, 1));
///
/// let results = index.search(&[0.9, 0.1, 0.0], 2).unwrap();
/// assert_eq!(results[0].0, a);
/// assert_eq!(results[1].0, b);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BruteForceIndex {
    /// The dimension of vectors in this index.
    dimension: usize,
    /// Row-major vector data; vector `i` is `data[i * dimension..(i + 1) * dimension]`.
    data: Vec<f32>,
}

impl BruteForceIndex {
    /// Creates an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `dimension` is 0 or does not fit
    /// the `u32` dimension field of the encoded form.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::InvalidInput(
                "index dimension must be non-zero".into(),
            ));
        }
        encoded_dimension(dimension)?;

        Ok(Self {
            dimension,
            data: Vec::new(),
        })
    }

    /// Returns the ID the next added vector will receive.
    #[inline]
    pub fn next_id(&self) -> VectorId {
        self.len() as VectorId
    }

    /// Iterates over `(id, vector)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (VectorId, &[f32])> {
        self.data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(pos, v)| (pos as VectorId, v))
    }

    fn check_dimension(&self, got: usize) -> Result<()> {
        if got != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got,
            });
        }
        Ok(())
    }
}

/// Orders `(id, distance)` pairs by distance, then by ID.
///
/// NaN distances rank after every number whatever their sign bit.
fn compare_hits(a: &(VectorId, f32), b: &(VectorId, f32)) -> Ordering {
    a.1.is_nan()
        .cmp(&b.1.is_nan())
        .then_with(|| a.1.total_cmp(&b.1))
        .then_with(|| a.0.cmp(&b.0))
}

fn encoded_dimension(dimension: usize) -> Result<u32> {
    u32::try_from(dimension).map_err(|_| {
        Error::InvalidInput(format!(
            "index dimension {} exceeds the encodable maximum {}",
            dimension,
            u32::MAX
        ))
    })
}

impl VectorIndex for BruteForceIndex {
    fn with_dimension(dimension: usize) -> Result<Self> {
        Self::new(dimension)
    }

    #[inline]
    fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    fn add(&mut self, vector: &[f32]) -> Result<VectorId> {
        self.check_dimension(vector.len())?;

        let id = self.next_id();
        self.data.extend_from_slice(vector);
        Ok(id)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(VectorId, f32)>> {
        self.check_dimension(query.len())?;

        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates: Vec<(VectorId, f32)> = self
            .iter()
            .map(|(id, v)| (id, euclidean_distance_squared(query, v)))
            .collect();

        // Partition the k best to the front before sorting them.
        if k < candidates.len() {
            candidates.select_nth_unstable_by(k - 1, compare_hits);
            candidates.truncate(k);
        }
        candidates.sort_unstable_by(compare_hits);

        Ok(candidates)
    }

    fn get(&self, id: VectorId) -> Option<&[f32]> {
        let pos = usize::try_from(id).ok()?;
        let start = pos.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    fn truncate(&mut self, len: usize) {
        self.data.truncate(len.saturating_mul(self.dimension));
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let dimension = encoded_dimension(self.dimension)?;
        let mut buf = Vec::with_capacity(HEADER_LEN + self.data.len() * 4 + CHECKSUM_LEN);

        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        buf.extend_from_slice(&dimension.to_le_bytes());
        buf.extend_from_slice(&(self.len() as u64).to_le_bytes());
        for &val in &self.data {
            buf.extend_from_slice(&val.to_le_bytes());
        }

        let checksum = crc32fast::hash(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());
        Ok(buf)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
            return Err(Error::CorruptSnapshot(format!(
                "vector data truncated: {} bytes",
                bytes.len()
            )));
        }

        let (body, checksum_bytes) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
        let expected_checksum = u32::from_le_bytes(read_array(checksum_bytes, 0));
        let actual_checksum = crc32fast::hash(body);
        if actual_checksum != expected_checksum {
            return Err(Error::CorruptSnapshot(format!(
                "vector data checksum mismatch: expected {}, got {}",
                expected_checksum, actual_checksum
            )));
        }

        if &body[..4] != MAGIC {
            return Err(Error::CorruptSnapshot("bad vector data magic".into()));
        }

        let version = u32::from_le_bytes(read_array(body, 4));
        if version != FORMAT_VERSION {
            return Err(Error::CorruptSnapshot(format!(
                "unsupported vector data version: {}",
                version
            )));
        }

        let dimension = u32::from_le_bytes(read_array(body, 8)) as usize;
        if dimension == 0 {
            return Err(Error::CorruptSnapshot("vector dimension is zero".into()));
        }

        let count = u64::from_le_bytes(read_array(body, 12));
        let expected_len = usize::try_from(count)
            .ok()
            .and_then(|c| c.checked_mul(dimension))
            .and_then(|n| n.checked_mul(4))
            .and_then(|n| n.checked_add(HEADER_LEN));
        if expected_len != Some(body.len()) {
            return Err(Error::CorruptSnapshot(format!(
                "vector data length mismatch: header declares {} vectors of dimension {}, file has {} bytes",
                count,
                dimension,
                bytes.len()
            )));
        }

        let data = body[HEADER_LEN..]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        Ok(Self { dimension, data })
    }
}

/// Reads a fixed-size array at `offset`; callers check bounds first.
fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_index() -> BruteForceIndex {
        let mut index = BruteForceIndex::new(3).unwrap();
        index.add(&[1.0, 0.0, 0.0]).unwrap();
        index.add(&[0.0, 1.0, 0.0]).unwrap();
        index.add(&[0.0, 0.0, 1.0]).unwrap();
        index
    }

    #[test]
    fn test_new_index() {
        let index = BruteForceIndex::new(768).unwrap();
        assert_eq!(index.dimension(), 768);
        assert!(index.is_empty());
        assert_eq!(index.next_id(), 0);
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut index = BruteForceIndex::new(2).unwrap();
        assert_eq!(index.add(&[1.0, 2.0]).unwrap(), 0);
        assert_eq!(index.add(&[3.0, 4.0]).unwrap(), 1);
        assert_eq!(index.add(&[5.0, 6.0]).unwrap(), 2);
        assert_eq!(index.len(), 3);
        assert_eq!(index.get(1), Some(&[3.0, 4.0][..]));
        assert_eq!(index.get(3), None);
    }

    #[test]
    fn test_add_dimension_mismatch() {
        let mut index = BruteForceIndex::new(3).unwrap();
        let result = index.add(&[1.0, 2.0]);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_basic() {
        let index = create_test_index();

        let results = index.search(&[1.0, 0.0, 0.0], 3).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], (0, 0.0));
        assert_eq!(results[1], (1, 2.0));
        assert_eq!(results[2], (2, 2.0));
    }

    #[test]
    fn test_search_k_limit() {
        let index = create_test_index();

        let results = index.search(&[0.0, 0.0, 1.0], 1).unwrap();
        assert_eq!(results, vec![(2, 0.0)]);
    }

    #[test]
    fn test_search_ties_prefer_lower_id() {
        let mut index = BruteForceIndex::new(2).unwrap();
        for _ in 0..5 {
            index.add(&[1.0, 1.0]).unwrap();
        }

        let results = index.search(&[0.0, 0.0], 3).unwrap();
        let ids: Vec<VectorId> = results.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_search_k_larger_than_len() {
        let index = create_test_index();
        assert_eq!(index.search(&[0.0, 0.0, 0.0], 100).unwrap().len(), 3);
    }

    #[test]
    fn test_search_k_zero() {
        let index = create_test_index();
        assert!(index.search(&[1.0, 0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_search_empty_index() {
        let index = BruteForceIndex::new(3).unwrap();
        assert!(index.search(&[1.0, 0.0, 0.0], 10).unwrap().is_empty());
    }

    #[test]
    fn test_search_query_dimension_mismatch() {
        let index = create_test_index();
        let result = index.search(&[1.0, 0.0], 1);
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_truncate() {
        let mut index = create_test_index();
        index.truncate(1);
        assert_eq!(index.len(), 1);
        assert_eq!(index.next_id(), 1);
        assert!(index.get(1).is_none());
    }

    #[test]
    fn test_bytes_round_trip() {
        let index = create_test_index();
        let restored = BruteForceIndex::from_bytes(&index.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, index);
        assert_eq!(restored.next_id(), 3);
    }

    #[test]
    fn test_empty_bytes_round_trip() {
        let index = BruteForceIndex::new(4).unwrap();
        let bytes = index.to_bytes().unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + CHECKSUM_LEN);

        let restored = BruteForceIndex::from_bytes(&bytes).unwrap();
        assert_eq!(restored.dimension(), 4);
        assert!(restored.is_empty());
    }

    #[test]
    fn test_from_bytes_detects_bit_flip() {
        let mut bytes = create_test_index().to_bytes().unwrap();
        bytes[HEADER_LEN + 1] ^= 0xFF;

        let result = BruteForceIndex::from_bytes(&bytes);
        assert!(matches!(result, Err(Error::CorruptSnapshot(_))));
    }

    #[test]
    fn test_from_bytes_detects_truncation() {
        let bytes = create_test_index().to_bytes().unwrap();
        let result = BruteForceIndex::from_bytes(&bytes[..10]);
        assert!(matches!(result, Err(Error::CorruptSnapshot(_))));
    }

    #[test]
    fn test_from_bytes_detects_count_mismatch() {
        // Rewrite the header count and re-checksum so only the length check fires.
        let bytes = create_test_index().to_bytes().unwrap();
        let mut body = bytes[..bytes.len() - CHECKSUM_LEN].to_vec();
        body[12..20].copy_from_slice(&5u64.to_le_bytes());
        let checksum = crc32fast::hash(&body);
        body.extend_from_slice(&checksum.to_le_bytes());

        let result = BruteForceIndex::from_bytes(&body);
        assert!(matches!(result, Err(Error::CorruptSnapshot(_))));
    }

    #[test]
    fn test_new_rejects_bad_dimension() {
        assert!(matches!(
            BruteForceIndex::new(0),
            Err(Error::InvalidInput(_))
        ));

        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            BruteForceIndex::new(u32::MAX as usize + 1),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_nan_distances_rank_last() {
        let mut index = BruteForceIndex::new(4).unwrap();
        // Negative NaN sorts before every number under plain total_cmp.
        index.add(&[-f32::NAN, 0.0, 0.0, 0.0]).unwrap();
        index.add(&[f32::NAN, 0.0, 0.0, 0.0]).unwrap();
        let id = index.add(&[0.0, 0.0, 0.0, 0.0]).unwrap();
        index.add(&[3.0, 0.0, 0.0, 0.0]).unwrap();

        let top = index.search(&[0.0, 0.0, 0.0, 0.0], 1).unwrap();
        assert_eq!(top, vec![(id, 0.0)]);

        let all = index.search(&[0.0, 0.0, 0.0, 0.0], 4).unwrap();
        let ids: Vec<VectorId> = all.iter().map(|(id, _)| *id).collect();
        assert_eq!(&ids[..2], &[id, 3]);
        assert!(all[2..].iter().all(|(_, d)| d.is_nan()));
    }
}
