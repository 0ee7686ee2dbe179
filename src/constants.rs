//! Cross-cutting, shared constants.
//!
//! The defaults describe the reference encoder (all-MiniLM-L6-v2). Any other
//! BERT-family sentence encoder works as long as its config is passed through
//! [`EncoderConfig`](crate::embedding::EncoderConfig).

pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

pub const STUB_MODEL_ID: &str = "stub";

pub const DEFAULT_EMBEDDING_DIM: usize = 384;

pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Inputs longer than this (in bytes, after normalization) are rejected per call.
pub const MAX_INPUT_BYTES: usize = 1024 * 1024;

/// Tolerance used when checking the unit-norm invariant.
pub const UNIT_NORM_TOLERANCE: f32 = 1e-5;

pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

pub const DEFAULT_EMBED_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_PREVIEW_LEN: usize = 200;
