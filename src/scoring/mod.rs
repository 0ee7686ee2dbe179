//! Similarity scoring between embeddings and score presentation helpers.
//!
//! Embeddings are unit length by construction (see [`Embedding`](crate::embedding::Embedding)),
//! so cosine similarity is the plain inner product computed by [`score`].

pub mod scorer;


pub use scorer::{format_score, percentile, score, score_all};
