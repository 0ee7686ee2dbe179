//! Sentence embeddings.
//!
//! - [`encoder`] turns text into unit-norm vectors ([`SentenceEncoder`], [`TextEncoder`]).
//! - [`vector`] holds the [`Embedding`] type and its invariants.

/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Sentence encoder (BERT-family model or deterministic stub).
pub mod encoder;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Tokenizer loading helpers.
pub mod utils;
/// Unit-norm embedding vectors.
pub mod vector;

pub use encoder::{EncoderConfig, SentenceEncoder, TextEncoder};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEncoder;
pub use vector::Embedding;
