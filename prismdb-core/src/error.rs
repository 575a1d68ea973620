//! Error types for PrismDB operations.

use thiserror::Error;

/// Result type alias using PrismDB's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during PrismDB operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input was missing or out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Vector dimension mismatch between index and input.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// No entry with the given ID exists.
    #[error("entry not found: {0}")]
    NotFound(u64),

    /// Attempted to insert metadata under an ID that is already taken.
    #[error("duplicate entry id: {0}")]
    DuplicateId(u64),

    /// The vector index and the metadata store disagree.
    ///
    /// This is never expected in a healthy process and means an earlier
    /// mutation was only partially applied.
    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),

    /// The on-disk snapshot is structurally invalid.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// IO error during storage operations.
    #[error("io error: {0}")]
    IoError(String),

    /// An external encoder failed to produce an embedding.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// A blocking task could not be joined by the async runtime.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl Error {
    /// Returns true for errors caused by caller input rather than by state.
    ///
    /// Such errors never mutate the collection and the call may be retried
    /// with corrected arguments.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::DimensionMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::DimensionMismatch {
            expected: 768,
            got: 512,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 768, got 512");
        assert_eq!(Error::NotFound(7).to_string(), "entry not found: 7");
    }

    #[test]
    fn test_validation_errors() {
        assert!(Error::InvalidInput("no modality".into()).is_validation());
        assert!(Error::DimensionMismatch {
            expected: 4,
            got: 3
        }
        .is_validation());
        assert!(!Error::CorruptSnapshot("bad".into()).is_validation());
        assert!(!Error::InternalConsistency("desync".into()).is_validation());
    }
}
