//! Embedding cache: avoids re-encoding unchanged text.

pub mod embedding;


pub use embedding::{CachedEncoder, EmbeddingCache};
