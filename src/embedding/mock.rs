//! Programmable encoder for tests (`mock` feature).

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::embedding::encoder::TextEncoder;
use crate::embedding::error::EmbeddingError;
use crate::embedding::vector::Embedding;

const DEFAULT_MOCK_DIM: usize = 64;

/// Bag-of-words encoder with per-text overrides and failure injection.
///
/// Unknown texts are encoded as lowercase word counts; every new word gets the
/// next free slot, so small vocabularies never collide. The last slot is
/// reserved for texts without any word. Every call is counted.
pub struct MockEncoder {
    model_id: String,
    dim: usize,
    fixed: HashMap<String, Vec<f32>>,
    failing: HashSet<String>,
    vocab: Mutex<HashMap<String, usize>>,
    calls: AtomicUsize,
    texts_encoded: AtomicUsize,
}

impl Default for MockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEncoder {
    pub fn new() -> Self {
        Self::with_dim(DEFAULT_MOCK_DIM)
    }

    /// `dim` must be at least 2.
    pub fn with_dim(dim: usize) -> Self {
        Self {
            model_id: "mock".to_string(),
            dim: dim.max(2),
            fixed: HashMap::new(),
            failing: HashSet::new(),
            vocab: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            texts_encoded: AtomicUsize::new(0),
        }
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Pins the raw (pre-normalization) vector returned for `text`.
    pub fn with_vector(mut self, text: impl Into<String>, values: Vec<f32>) -> Self {
        self.fixed.insert(text.into(), values);
        self
    }

    /// Makes any batch containing `text` fail with `InferenceFailed`.
    pub fn failing_on(mut self, text: impl Into<String>) -> Self {
        self.failing.insert(text.into());
        self
    }

    /// Number of `embed` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Total number of texts passed to `embed`.
    pub fn texts_encoded(&self) -> usize {
        self.texts_encoded.load(Ordering::SeqCst)
    }

    fn bag_of_words(&self, text: &str) -> Vec<f32> {
        let mut values = vec![0.0f32; self.dim];
        let mut vocab = self.vocab.lock();
        let slots = self.dim - 1;

        let mut any = false;
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            let next = vocab.len();
            let slot = *vocab.entry(word).or_insert(next) % slots;
            values[slot] += 1.0;
            any = true;
        }

        if !any {
            values[slots] = 1.0;
        }
        values
    }
}

impl TextEncoder for MockEncoder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn embedding_dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts_encoded.fetch_add(texts.len(), Ordering::SeqCst);

        if let Some(text) = texts.iter().find(|t| self.failing.contains(**t)) {
            return Err(EmbeddingError::InferenceFailed {
                reason: format!("mock failure for {:?}", text),
            });
        }

        texts
            .iter()
            .map(|text| match self.fixed.get(*text) {
                Some(values) if values.len() != self.dim => {
                    Err(EmbeddingError::DimensionMismatch {
                        expected: self.dim,
                        actual: values.len(),
                    })
                }
                Some(values) => Embedding::from_raw(values.clone()),
                None => Embedding::from_raw(self.bag_of_words(text)),
            })
            .collect()
    }
}
