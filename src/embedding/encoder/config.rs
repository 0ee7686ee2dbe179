use std::path::PathBuf;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_EMBEDDING_DIM, DEFAULT_MAX_SEQ_LEN, DEFAULT_MODEL_ID,
    STUB_MODEL_ID,
};
use crate::embedding::error::EmbeddingError;

#[derive(Debug, Clone)]
/// Configuration for [`SentenceEncoder`](super::SentenceEncoder).
pub struct EncoderConfig {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    pub model_dir: PathBuf,
    /// Identity recorded in cache fingerprints and result sets.
    pub model_id: String,
    /// Max tokens per text; longer inputs are truncated.
    pub max_seq_len: usize,
    /// Texts per forward pass.
    pub batch_size: usize,
    /// Output dimension. Checked against the model's hidden size on load.
    pub embedding_dim: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::new(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            batch_size: DEFAULT_BATCH_SIZE,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            testing_stub: false,
        }
    }
}

impl EncoderConfig {
    /// Env var used to locate the model directory.
    pub const ENV_MODEL_DIR: &'static str = "RANKER_MODEL_DIR";
    /// Env var overriding the recorded model id.
    pub const ENV_MODEL_ID: &'static str = "RANKER_MODEL_ID";

    /// Loads the model location from the environment (missing dir becomes an empty path).
    pub fn from_env() -> Self {
        let model_dir = std::env::var(Self::ENV_MODEL_DIR)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_default();

        let model_id = std::env::var(Self::ENV_MODEL_ID)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());

        Self {
            model_dir,
            model_id,
            ..Default::default()
        }
    }

    /// Creates a config for a model directory.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            model_id: STUB_MODEL_ID.to_string(),
            testing_stub: true,
            ..Default::default()
        }
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    pub fn config_path(&self) -> PathBuf {
        self.model_dir.join("config.json")
    }

    pub fn weights_path(&self) -> PathBuf {
        self.model_dir.join("model.safetensors")
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir.join("tokenizer.json")
    }

    /// Validates field ranges and, outside stub mode, that the model files exist.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.model_id.trim().is_empty() || self.model_id.contains('\0') {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_id must be non-empty and contain no NUL bytes".to_string(),
            });
        }

        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be positive".to_string(),
            });
        }

        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be positive".to_string(),
            });
        }

        if self.batch_size == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "batch_size must be positive".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        }

        if !self.model_dir.is_dir() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.model_dir.clone(),
            });
        }

        for path in [self.config_path(), self.weights_path(), self.tokenizer_path()] {
            if !path.exists() {
                return Err(EmbeddingError::ModelNotFound { path });
            }
        }

        Ok(())
    }

    /// Returns `true` if all three model files are present.
    pub fn model_available(&self) -> bool {
        !self.model_dir.as_os_str().is_empty()
            && self.config_path().exists()
            && self.weights_path().exists()
            && self.tokenizer_path().exists()
    }
}
