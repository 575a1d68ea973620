//! Late fusion of image and text embeddings.
//!
//! Both encoders map into the same embedding space, so a query or a catalog
//! item with both an image and a description is represented by a weighted
//! average of the two vectors.

use crate::error::{Error, Result};
use crate::vector::Vector;

/// Default image weight; image and text contribute equally.
pub const DEFAULT_ALPHA: f32 = 0.5;

/// Combines an optional image embedding and an optional text embedding.
///
/// The combination is `alpha * image + (1 - alpha) * text`. No normalization
/// is applied; callers ranking by angle should normalize before or after.
///
/// # Example
///
/// ```
/// use prismdb_core::FusionCombiner;
///
/// let fusion = FusionCombiner::new(0.5, 2).unwrap();
///
/// let both = fusion.combine(Some(&[1.0, 0.0][..]), Some(&[0.0, 1.0][..])).unwrap();
/// assert_eq!(both.as_slice(), &[0.5, 0.5]);
///
/// let text_only = fusion.combine(None, Some(&[0.3, 0.7][..])).unwrap();
/// assert_eq!(text_only.as_slice(), &[0.3, 0.7]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionCombiner {
    alpha: f32,
    dimension: usize,
}

impl FusionCombiner {
    /// Creates a combiner with image weight `alpha` for vectors of `dimension`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `alpha` is not within `[0, 1]` or
    /// `dimension` is 0.
    pub fn new(alpha: f32, dimension: usize) -> Result<Self> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(Error::InvalidInput(format!(
                "fusion alpha must be within [0, 1], got {}",
                alpha
            )));
        }
        if dimension == 0 {
            return Err(Error::InvalidInput(
                "fusion dimension must be non-zero".into(),
            ));
        }
        Ok(Self { alpha, dimension })
    }

    /// Weight applied to the image embedding.
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Fuses whichever modalities are present into one vector.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if both inputs are `None`.
    /// - [`Error::DimensionMismatch`] if a present input does not have the
    ///   configured dimension.
    pub fn combine(&self, image: Option<&[f32]>, text: Option<&[f32]>) -> Result<Vector> {
        match (image, text) {
            (None, None) => Err(Error::InvalidInput(
                "at least one of image or text embedding is required".into(),
            )),
            (Some(single), None) | (None, Some(single)) => {
                self.check_dimension(single)?;
                Ok(Vector::new(single))
            }
            (Some(image), Some(text)) => {
                self.check_dimension(image)?;
                self.check_dimension(text)?;

                let beta = 1.0 - self.alpha;
                let fused = image
                    .iter()
                    .zip(text)
                    .map(|(i, t)| self.alpha * i + beta * t)
                    .collect();
                Ok(Vector::from_vec(fused))
            }
        }
    }

    fn check_dimension(&self, v: &[f32]) -> Result<()> {
        if v.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got: v.len(),
            });
        }
        Ok(())
    }
}
