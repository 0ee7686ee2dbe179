use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ranker::ranking::{Document, DocumentId, RankRequest, RankingResultSet};
use ranker::scoring::{format_score, percentile};

/// Document ids arrive as strings or integers.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for DocumentId {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Text(id) => DocumentId::new(id),
            RawId::Number(id) => DocumentId::from(id),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct DocumentPayload {
    pub id: RawId,
    pub text: String,
}

/// Body of `POST /v1/rank`.
#[derive(Deserialize, Debug, Clone)]
pub struct RankPayload {
    pub query: Option<DocumentPayload>,
    #[serde(default)]
    pub candidates: Vec<DocumentPayload>,
}

impl RankPayload {
    pub fn into_request(self) -> RankRequest {
        RankRequest {
            query: self.query.map(|q| Document::query(q.id, q.text)),
            candidates: self
                .candidates
                .into_iter()
                .map(|c| Document::candidate(c.id, c.text))
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RankedCandidate {
    pub candidate_id: DocumentId,
    pub rank: u32,
    pub similarity: f32,
    /// Four-decimal display form of `similarity`.
    pub score: String,
    pub percentile: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RankResponse {
    pub query_id: DocumentId,
    pub model_id: String,
    pub run_id: Uuid,
    pub ranked_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_preview: Option<String>,
    pub results: Vec<RankedCandidate>,
}

impl RankResponse {
    pub fn from_result(set: &RankingResultSet, query_preview: Option<String>) -> Self {
        let all: Vec<f32> = set.scores.iter().map(|s| s.similarity).collect();

        Self {
            query_id: set.query_id.clone(),
            model_id: set.model_id.clone(),
            run_id: set.run_id,
            ranked_at: set.ranked_at,
            query_preview,
            results: set
                .scores
                .iter()
                .map(|s| RankedCandidate {
                    candidate_id: s.candidate_id.clone(),
                    rank: s.rank,
                    similarity: s.similarity,
                    score: format_score(s.similarity),
                    percentile: percentile(s.similarity, &all),
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QueryListResponse {
    pub query_ids: Vec<DocumentId>,
}
