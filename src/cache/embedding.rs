//! Fingerprint-keyed embedding cache.
//!
//! Keys are `text_fingerprint(model_id, normalized_text)`, so an entry is only
//! reused for byte-identical text under the same model. Changed text produces a
//! new key; the stale entry ages out under LRU pressure.

use moka::sync::Cache;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::embedding::{Embedding, EmbeddingError, TextEncoder};
use crate::hashing::text_fingerprint;

/// In-memory embedding store keyed by content fingerprint.
pub struct EmbeddingCache {
    entries: Cache<[u8; 32], Arc<Embedding>>,
}

impl EmbeddingCache {
    /// Creates a cache with a max entry capacity (LRU eviction).
    #[inline]
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    #[inline]
    pub fn get(&self, key: &[u8; 32]) -> Option<Arc<Embedding>> {
        self.entries.get(key)
    }

    #[inline]
    pub fn insert(&self, key: [u8; 32], embedding: Arc<Embedding>) {
        self.entries.insert(key, embedding);
    }

    #[inline]
    pub fn contains(&self, key: &[u8; 32]) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of cached entries (approximate until pending tasks run).
    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    #[inline]
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Runs any pending maintenance tasks in the underlying cache.
    #[inline]
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}

impl std::fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

/// [`TextEncoder`] wrapper that skips re-encoding texts it has already seen.
///
/// All misses of one call go to the inner encoder as a single batch (each
/// distinct text once). Output order and length match the input.
pub struct CachedEncoder<E> {
    inner: E,
    cache: Option<EmbeddingCache>,
}

impl<E: TextEncoder> CachedEncoder<E> {
    /// Wraps `inner`; a capacity of `0` disables caching.
    pub fn new(inner: E, capacity: u64) -> Self {
        let cache = (capacity > 0).then(|| EmbeddingCache::with_capacity(capacity));
        Self { inner, cache }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn cache(&self) -> Option<&EmbeddingCache> {
        self.cache.as_ref()
    }

    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }
}

impl<E: TextEncoder> TextEncoder for CachedEncoder<E> {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn embedding_dim(&self) -> usize {
        self.inner.embedding_dim()
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        let Some(cache) = &self.cache else {
            return self.inner.embed(texts);
        };

        let model_id = self.inner.model_id();
        let keys: Vec<[u8; 32]> = texts
            .iter()
            .map(|t| text_fingerprint(model_id, t))
            .collect();

        let mut resolved: Vec<Option<Arc<Embedding>>> = keys.iter().map(|k| cache.get(k)).collect();

        // Distinct missing texts, in first-seen order, with their original position.
        let mut miss_slot: HashMap<[u8; 32], usize> = HashMap::new();
        let mut miss_texts: Vec<&str> = Vec::new();
        let mut miss_origin: Vec<usize> = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            if resolved[i].is_none() && !miss_slot.contains_key(key) {
                miss_slot.insert(*key, miss_texts.len());
                miss_texts.push(texts[i]);
                miss_origin.push(i);
            }
        }

        debug!(
            total = texts.len(),
            hits = texts.len() - resolved.iter().filter(|r| r.is_none()).count(),
            encoded = miss_texts.len(),
            "Embedding cache lookup"
        );

        if !miss_texts.is_empty() {
            let fresh = self
                .inner
                .embed(&miss_texts)
                .map_err(|e| e.map_index(|i| miss_origin.get(i).copied().unwrap_or(i)))?;

            if fresh.len() != miss_texts.len() {
                return Err(EmbeddingError::InferenceFailed {
                    reason: format!(
                        "encoder returned {} vectors for {} texts",
                        fresh.len(),
                        miss_texts.len()
                    ),
                });
            }

            let fresh: Vec<Arc<Embedding>> = fresh.into_iter().map(Arc::new).collect();
            for (i, key) in keys.iter().enumerate() {
                if resolved[i].is_none() {
                    let embedding = Arc::clone(&fresh[miss_slot[key]]);
                    resolved[i] = Some(embedding);
                }
            }
            for (slot, embedding) in fresh.into_iter().enumerate() {
                cache.insert(keys[miss_origin[slot]], embedding);
            }
        }

        Ok(resolved
            .into_iter()
            .flatten()
            .map(|e| Embedding::clone(&e))
            .collect())
    }
}

impl<E: TextEncoder + std::fmt::Debug> std::fmt::Debug for CachedEncoder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedEncoder")
            .field("inner", &self.inner)
            .field("cache", &self.cache)
            .finish()
    }
}
