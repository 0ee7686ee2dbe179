//! Sentence encoder (BERT-family model or deterministic stub).
//!
//! Use [`EncoderConfig::stub`] for tests/examples without model files.

/// Encoder configuration.
pub mod config;
pub(crate) mod model;


pub use config::EncoderConfig;

use std::sync::Arc;

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::constants::MAX_INPUT_BYTES;
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::load_batch_tokenizer;
use crate::embedding::vector::Embedding;
use crate::hashing::hash_to_u64;

use model::SentenceBert;

/// Maps text to unit-norm vectors.
///
/// Implementations must return exactly one vector per input, in input order,
/// and every vector must come from the same model (`model_id`).
pub trait TextEncoder: Send + Sync {
    /// Identity of the underlying model; vectors from different ids are not comparable.
    fn model_id(&self) -> &str;

    fn embedding_dim(&self) -> usize;

    /// Encodes a batch of texts.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError>;

    /// Encodes a single text.
    fn embed_one(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut vectors = self.embed(&[text])?;
        match (vectors.pop(), vectors.is_empty()) {
            (Some(v), true) => Ok(v),
            _ => Err(EmbeddingError::InferenceFailed {
                reason: "encoder did not return exactly one vector".to_string(),
            }),
        }
    }
}

impl<T: TextEncoder + ?Sized> TextEncoder for Arc<T> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn embedding_dim(&self) -> usize {
        (**self).embedding_dim()
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        (**self).embed(texts)
    }
}

enum EncoderBackend {
    Model {
        model: Arc<SentenceBert>,
        tokenizer: Arc<Tokenizer>,
        device: Device,
    },
    Stub,
}

/// Sentence embedding encoder (supports stub mode).
pub struct SentenceEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
}

impl std::fmt::Debug for SentenceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("model_id", &self.config.model_id)
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEncoder {
    /// Loads the encoder from a config. Any error here is fatal for the encoder.
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Encoder running in STUB mode (testing only)");
            return Ok(Self {
                backend: EncoderBackend::Stub,
                config,
            });
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for encoder");

        let tokenizer =
            load_batch_tokenizer(&config.model_dir, config.max_seq_len).map_err(|e| {
                EmbeddingError::ModelLoadFailed {
                    reason: format!("Failed to load tokenizer: {}", e),
                }
            })?;

        let model = SentenceBert::load(&config.model_dir, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT model: {}", e),
            }
        })?;

        if model.hidden_size() != config.embedding_dim {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "embedding_dim ({}) does not match model hidden_size ({})",
                    config.embedding_dim,
                    model.hidden_size()
                ),
            });
        }

        info!(
            model_dir = %config.model_dir.display(),
            model_id = %config.model_id,
            embedding_dim = config.embedding_dim,
            num_layers = model.num_layers(),
            max_seq_len = config.max_seq_len,
            batch_size = config.batch_size,
            "Sentence encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model: Arc::new(model),
                tokenizer: Arc::new(tokenizer),
                device,
            },
            config,
        })
    }

    /// Shorthand for `load(EncoderConfig::stub())`.
    pub fn stub() -> Result<Self, EmbeddingError> {
        Self::load(EncoderConfig::stub())
    }

    fn check_input_sizes(texts: &[&str]) -> Result<(), EmbeddingError> {
        match texts
            .iter()
            .enumerate()
            .find(|(_, t)| t.len() > MAX_INPUT_BYTES)
        {
            Some((index, text)) => Err(EmbeddingError::InputTooLarge {
                index,
                len: text.len(),
                max: MAX_INPUT_BYTES,
            }),
            None => Ok(()),
        }
    }

    fn embed_with_model(
        &self,
        texts: &[&str],
        model: &SentenceBert,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<Embedding>, EmbeddingError> {
        let mut results = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.config.batch_size) {
            let encodings = tokenizer.encode_batch(chunk.to_vec(), true).map_err(|e| {
                EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                }
            })?;

            let batch = encodings.len();
            let seq_len = encodings.first().map(|e| e.len()).unwrap_or(0);
            if seq_len == 0 {
                return Err(EmbeddingError::TokenizationFailed {
                    reason: "tokenizer produced an empty sequence".to_string(),
                });
            }

            let mut ids = Vec::with_capacity(batch * seq_len);
            let mut type_ids = Vec::with_capacity(batch * seq_len);
            let mut mask = Vec::with_capacity(batch * seq_len);
            for encoding in &encodings {
                if encoding.len() != seq_len {
                    return Err(EmbeddingError::TokenizationFailed {
                        reason: format!(
                            "ragged batch: expected {} tokens, got {}",
                            seq_len,
                            encoding.len()
                        ),
                    });
                }
                ids.extend_from_slice(encoding.get_ids());
                type_ids.extend_from_slice(encoding.get_type_ids());
                mask.extend_from_slice(encoding.get_attention_mask());
            }

            debug!(batch, seq_len, "Encoder forward pass");

            let input_ids = Tensor::from_vec(ids, (batch, seq_len), device)?;
            let token_type_ids = Tensor::from_vec(type_ids, (batch, seq_len), device)?;
            let attention_mask = Tensor::from_vec(mask, (batch, seq_len), device)?;

            let pooled = model
                .forward_pooled(&input_ids, &token_type_ids, &attention_mask)
                .map_err(|e| EmbeddingError::InferenceFailed {
                    reason: format!("Transformer forward pass failed: {}", e),
                })?
                .to_vec2::<f32>()?;

            for row in pooled {
                results.push(Embedding::from_raw(row)?);
            }
        }

        Ok(results)
    }

    fn embed_stub(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut state = hash_to_u64(text.as_bytes());

        let mut values = Vec::with_capacity(self.config.embedding_dim);
        for _ in 0..self.config.embedding_dim {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            values.push(value);
        }

        Embedding::from_raw(values)
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub)
    }

    /// Returns `true` if a model is loaded.
    pub fn has_model(&self) -> bool {
        matches!(self.backend, EncoderBackend::Model { .. })
    }

    /// Returns the encoder configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl TextEncoder for SentenceEncoder {
    fn model_id(&self) -> &str {
        &self.config.model_id
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        Self::check_input_sizes(texts)?;

        debug!(
            batch = texts.len(),
            total_bytes = texts.iter().map(|t| t.len()).sum::<usize>(),
            stub = self.is_stub(),
            "Encoding texts"
        );

        match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.embed_with_model(texts, model, tokenizer, device),
            EncoderBackend::Stub => texts.iter().map(|text| self.embed_stub(text)).collect(),
        }
    }
}
