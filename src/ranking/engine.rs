use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use crate::embedding::{EmbeddingError, TextEncoder};
use crate::scoring::score_all;
use crate::text::normalize;

use super::error::{EncodeStage, RankingError, RankingResult};
use super::types::{Document, DocumentKind, RankRequest, RankingResultSet, Score};

/// Ranks candidate documents against one query by embedding similarity.
///
/// The engine is stateless apart from the shared encoder: a ranking call is
/// all-or-nothing and never returns a partial result.
pub struct RankingEngine<E> {
    encoder: Arc<E>,
}

impl<E> Clone for RankingEngine<E> {
    fn clone(&self) -> Self {
        Self {
            encoder: Arc::clone(&self.encoder),
        }
    }
}

impl<E: TextEncoder> RankingEngine<E> {
    pub fn new(encoder: E) -> Self {
        Self {
            encoder: Arc::new(encoder),
        }
    }

    pub fn from_shared(encoder: Arc<E>) -> Self {
        Self { encoder }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn model_id(&self) -> &str {
        self.encoder.model_id()
    }

    /// Ranks `candidates` against `query`.
    ///
    /// Every candidate gets exactly one [`Score`]; ranks run `1..=N` in order of
    /// decreasing similarity, with ties kept in input order.
    #[instrument(skip_all, fields(query_id = %query.id(), candidates = candidates.len()))]
    pub fn rank(
        &self,
        query: &Document,
        candidates: &[Document],
    ) -> RankingResult<RankingResultSet> {
        validate_inputs(query, candidates)?;

        let start = Instant::now();

        let query_text = normalize(query.text());
        let query_vec = self.encoder.embed_one(&query_text).map_err(|e| {
            RankingError::encoding(EncodeStage::Query, Some(query.id().clone()), e)
        })?;

        let candidate_texts: Vec<String> =
            candidates.iter().map(|c| normalize(c.text())).collect();
        let refs: Vec<&str> = candidate_texts.iter().map(String::as_str).collect();

        let candidate_vecs = self.encoder.embed(&refs).map_err(|e| {
            let document_id = e
                .index()
                .and_then(|i| candidates.get(i))
                .map(|c| c.id().clone());
            RankingError::encoding(EncodeStage::Candidates, document_id, e)
        })?;

        if candidate_vecs.len() != candidates.len() {
            return Err(RankingError::encoding(
                EncodeStage::Candidates,
                None,
                EmbeddingError::InferenceFailed {
                    reason: format!(
                        "encoder returned {} vectors for {} candidates",
                        candidate_vecs.len(),
                        candidates.len()
                    ),
                },
            ));
        }

        if let Some((doc, vec)) = candidates
            .iter()
            .zip(&candidate_vecs)
            .find(|(_, v)| v.dim() != query_vec.dim())
        {
            return Err(RankingError::encoding(
                EncodeStage::Candidates,
                Some(doc.id().clone()),
                EmbeddingError::DimensionMismatch {
                    expected: query_vec.dim(),
                    actual: vec.dim(),
                },
            ));
        }

        let similarities = score_all(&query_vec, &candidate_vecs);

        // Stable sort: equal similarities keep input order.
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            similarities[b]
                .partial_cmp(&similarities[a])
                .unwrap_or(Ordering::Equal)
        });

        let scores: Vec<Score> = order
            .into_iter()
            .enumerate()
            .map(|(position, idx)| Score {
                candidate_id: candidates[idx].id().clone(),
                query_id: query.id().clone(),
                similarity: similarities[idx],
                rank: position as u32 + 1,
            })
            .collect();

        let result = RankingResultSet::new(query.id().clone(), self.encoder.model_id(), scores);

        info!(
            run_id = %result.run_id,
            model_id = %result.model_id,
            top_similarity = result.scores.first().map(|s| s.similarity).unwrap_or_default(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Ranking completed"
        );

        Ok(result)
    }

    /// Ranks a request whose query may be absent.
    pub fn rank_request(&self, request: &RankRequest) -> RankingResult<RankingResultSet> {
        let query = request.query.as_ref().ok_or(RankingError::MissingQuery)?;
        self.rank(query, &request.candidates)
    }
}

impl<E: TextEncoder + 'static> RankingEngine<E> {
    /// Runs [`rank_request`](Self::rank_request) on the blocking pool, bounded by `limit`.
    ///
    /// On timeout the call fails with [`RankingError::Timeout`]; the encoder
    /// work already started finishes in the background and its result is
    /// dropped. `None` waits indefinitely.
    pub async fn rank_with_timeout(
        &self,
        request: RankRequest,
        limit: Option<Duration>,
    ) -> RankingResult<RankingResultSet> {
        let engine = self.clone();
        let task = tokio::task::spawn_blocking(move || engine.rank_request(&request));

        let joined = match limit {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(limit_ms = limit.as_millis() as u64, "Ranking timed out");
                    return Err(RankingError::Timeout {
                        limit_ms: limit.as_millis() as u64,
                    });
                }
            },
            None => task.await,
        };

        joined.map_err(|e| RankingError::Worker {
            reason: e.to_string(),
        })?
    }
}

fn validate_inputs(query: &Document, candidates: &[Document]) -> RankingResult<()> {
    if query.kind() != DocumentKind::Query {
        return Err(RankingError::WrongKind {
            id: query.id().clone(),
            expected: DocumentKind::Query,
            actual: query.kind(),
        });
    }

    if query.id().is_empty() {
        return Err(RankingError::EmptyDocumentId {
            kind: DocumentKind::Query,
            position: 0,
        });
    }

    if candidates.is_empty() {
        return Err(RankingError::NoCandidates);
    }

    let mut seen = HashSet::with_capacity(candidates.len());
    for (position, candidate) in candidates.iter().enumerate() {
        if candidate.kind() != DocumentKind::Candidate {
            return Err(RankingError::WrongKind {
                id: candidate.id().clone(),
                expected: DocumentKind::Candidate,
                actual: candidate.kind(),
            });
        }

        if candidate.id().is_empty() {
            return Err(RankingError::EmptyDocumentId {
                kind: DocumentKind::Candidate,
                position,
            });
        }

        if !seen.insert(candidate.id()) {
            return Err(RankingError::DuplicateCandidate {
                id: candidate.id().clone(),
            });
        }
    }

    debug!(candidates = candidates.len(), "Ranking inputs validated");
    Ok(())
}
