use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load embedding model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("{device} device unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("invalid encoder configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("input {index} is {len} bytes, exceeds limit of {max}")]
    InputTooLarge { index: usize, len: usize, max: usize },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("degenerate embedding: {reason}")]
    DegenerateVector { reason: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl EmbeddingError {
    /// Fatal errors raised while constructing an encoder.
    pub fn is_initialization(&self) -> bool {
        matches!(
            self,
            EmbeddingError::ModelNotFound { .. }
                | EmbeddingError::ModelLoadFailed { .. }
                | EmbeddingError::DeviceUnavailable { .. }
                | EmbeddingError::InvalidConfig { .. }
        )
    }

    /// Errors the caller can fix by changing the input text.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, EmbeddingError::InputTooLarge { .. })
    }

    /// Position of the offending text within the batch, when known.
    pub fn index(&self) -> Option<usize> {
        match self {
            EmbeddingError::InputTooLarge { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Rewrites the batch position (used when a sub-batch is forwarded).
    pub fn map_index(self, f: impl FnOnce(usize) -> usize) -> Self {
        match self {
            EmbeddingError::InputTooLarge { index, len, max } => EmbeddingError::InputTooLarge {
                index: f(index),
                len,
                max,
            },
            other => other,
        }
    }
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        EmbeddingError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for EmbeddingError {
    fn from(err: std::io::Error) -> Self {
        EmbeddingError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}
