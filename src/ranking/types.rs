use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::scoring::percentile;

/// Opaque document identifier supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for DocumentId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Role of a document in a ranking call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// The job description ranked against.
    Query,
    /// A resume being ranked.
    Candidate,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Query => write!(f, "query"),
            DocumentKind::Candidate => write!(f, "candidate"),
        }
    }
}

/// Extracted plain text plus its identity. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    text: String,
    kind: DocumentKind,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, text: impl Into<String>, kind: DocumentKind) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind,
        }
    }

    pub fn query(id: impl Into<DocumentId>, text: impl Into<String>) -> Self {
        Self::new(id, text, DocumentKind::Query)
    }

    pub fn candidate(id: impl Into<DocumentId>, text: impl Into<String>) -> Self {
        Self::new(id, text, DocumentKind::Candidate)
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }
}

/// Input of one ranking call. The query is explicit; there is no implicit default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankRequest {
    pub query: Option<Document>,
    #[serde(default)]
    pub candidates: Vec<Document>,
}

impl RankRequest {
    pub fn new(query: Document, candidates: Vec<Document>) -> Self {
        Self {
            query: Some(query),
            candidates,
        }
    }
}

/// One candidate's position for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub candidate_id: DocumentId,
    pub query_id: DocumentId,
    /// Cosine similarity in `[-1, 1]`.
    pub similarity: f32,
    /// 1-based; 1 is the most similar candidate.
    pub rank: u32,
}

/// Complete ordered ranking of all candidates for one query at one point in time.
///
/// Persisting a result set replaces, never merges with, the previous one for
/// the same `query_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResultSet {
    pub query_id: DocumentId,
    /// Encoder that produced the similarities.
    pub model_id: String,
    /// Unique per ranking invocation.
    pub run_id: Uuid,
    pub ranked_at: DateTime<Utc>,
    /// Ordered by rank (descending similarity).
    pub scores: Vec<Score>,
}

impl RankingResultSet {
    pub fn new(query_id: DocumentId, model_id: impl Into<String>, scores: Vec<Score>) -> Self {
        Self {
            query_id,
            model_id: model_id.into(),
            run_id: Uuid::new_v4(),
            ranked_at: Utc::now(),
            scores,
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The best `n` scores (fewer if the set is smaller).
    pub fn top(&self, n: usize) -> &[Score] {
        &self.scores[..n.min(self.scores.len())]
    }

    pub fn get(&self, candidate_id: &DocumentId) -> Option<&Score> {
        self.scores.iter().find(|s| &s.candidate_id == candidate_id)
    }

    /// Percentile of `candidate_id` within this set (share of strictly lower scores).
    pub fn percentile_of(&self, candidate_id: &DocumentId) -> Option<f32> {
        let target = self.get(candidate_id)?;
        let all: Vec<f32> = self.scores.iter().map(|s| s.similarity).collect();
        Some(percentile(target.similarity, &all))
    }

    /// Checks the result-set invariants.
    ///
    /// Ranks are exactly `1..=N` in order, similarities never increase, every
    /// row belongs to `query_id`, and each candidate appears once.
    pub fn validate(&self) -> Result<(), String> {
        if self.query_id.is_empty() {
            return Err("query_id cannot be empty".to_string());
        }

        if self.scores.is_empty() {
            return Err("result set has no scores".to_string());
        }

        let mut seen = HashSet::with_capacity(self.scores.len());
        for (i, score) in self.scores.iter().enumerate() {
            let expected_rank = i as u32 + 1;
            if score.rank != expected_rank {
                return Err(format!(
                    "rank at position {} is {}, expected {}",
                    i, score.rank, expected_rank
                ));
            }

            if score.query_id != self.query_id {
                return Err(format!(
                    "score for candidate {} belongs to query {}, not {}",
                    score.candidate_id, score.query_id, self.query_id
                ));
            }

            if !score.similarity.is_finite() {
                return Err(format!(
                    "similarity for candidate {} is not finite",
                    score.candidate_id
                ));
            }

            if !seen.insert(&score.candidate_id) {
                return Err(format!(
                    "candidate {} appears more than once",
                    score.candidate_id
                ));
            }

            if i > 0 && score.similarity > self.scores[i - 1].similarity {
                return Err(format!(
                    "similarity increases at rank {} ({} > {})",
                    score.rank,
                    score.similarity,
                    self.scores[i - 1].similarity
                ));
            }
        }

        Ok(())
    }
}
