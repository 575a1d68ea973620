//! Embedding vectors and their identifiers.

use crate::error::{Error, Result};

/// Identifier of a stored entry: its position in insertion order.
pub type VectorId = u64;

/// An embedding produced by an encoder or by fusion.
///
/// Encoders hand these to the [`FusionCombiner`](crate::FusionCombiner); the
/// collection only ever sees the fused slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    /// Copies an embedding out of a slice.
    ///
    /// ```
    /// use prismdb_core::Vector;
    ///
    /// let v = Vector::new(&[0.5, -0.25]);
    /// assert_eq!(v.dimension(), 2);
    /// assert!(v.is_finite());
    /// ```
    #[inline]
    pub fn new(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    pub fn from_vec(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns true if no component is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        check_finite(&self.data).is_ok()
    }

    #[inline]
    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::from_vec(data)
    }
}

impl AsRef<[f32]> for Vector {
    fn as_ref(&self) -> &[f32] {
        &self.data
    }
}

/// Rejects embeddings with NaN or infinite components.
///
/// Such a component makes every distance to the vector NaN or infinite, so
/// it could never be ranked against the rest of the index.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] naming the first offending position.
pub fn check_finite(values: &[f32]) -> Result<()> {
    match values.iter().position(|x| !x.is_finite()) {
        Some(pos) => Err(Error::InvalidInput(format!(
            "embedding component {} is {}",
            pos, values[pos]
        ))),
        None => Ok(()),
    }
}
