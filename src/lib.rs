//! Resume ranker library crate (used by the server and integration tests).
//!
//! Ranks candidate documents (resumes) against a query document (a job
//! description) by the cosine similarity of their sentence embeddings.
//!
//! # Public API Surface
//!
//! ## Ranking
//! - [`RankingEngine`] - normalize, encode, score, order, assign ranks
//! - [`Document`], [`DocumentId`], [`DocumentKind`], [`RankRequest`] - inputs
//! - [`Score`], [`RankingResultSet`] - outputs
//! - [`RankingError`], [`ErrorClass`] - failure taxonomy
//!
//! ## Embedding
//! - [`TextEncoder`] - the encoder seam
//! - [`SentenceEncoder`], [`EncoderConfig`] - BERT-family model or deterministic stub
//! - [`CachedEncoder`] - fingerprint-keyed embedding cache
//!
//! ## Persistence
//! - [`RankingStore`] with [`MemoryRankingStore`] and [`FileRankingStore`]
//!
//! ## Utilities
//! - [`normalize`], [`preview`] - text helpers
//! - [`score`], [`percentile`], [`format_score`] - scoring helpers
//!
//! ## Test/Mock Support
//! [`MockEncoder`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod hashing;
pub mod ranking;
pub mod scoring;
pub mod storage;
pub mod text;

pub use cache::{CachedEncoder, EmbeddingCache};
pub use config::{Config, ConfigError};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEncoder;
pub use embedding::{Embedding, EmbeddingError, EncoderConfig, SentenceEncoder, TextEncoder};
pub use hashing::{hash_document_id, hash_to_u64, text_fingerprint};
pub use ranking::{
    Document, DocumentId, DocumentKind, EncodeStage, ErrorClass, RankRequest, RankingEngine,
    RankingError, RankingResult, RankingResultSet, Score,
};
pub use scoring::{format_score, percentile, score, score_all};
pub use storage::{
    FileRankingStore, MemoryRankingStore, RankingStore, StorageError, StorageResult,
};
pub use text::{normalize, preview};
