use thiserror::Error;

use crate::embedding::EmbeddingError;

use super::types::{DocumentId, DocumentKind};

/// Which encoder call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeStage {
    Query,
    Candidates,
}

impl std::fmt::Display for EncodeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeStage::Query => write!(f, "query"),
            EncodeStage::Candidates => write!(f, "candidate"),
        }
    }
}

/// Coarse classification used by outer layers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller-correctable.
    InvalidInput,
    /// Inference failed; the whole call failed.
    Encoding,
    /// The encoder cannot serve requests at all.
    Initialization,
    /// The caller-supplied bound elapsed.
    Timeout,
}

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("query document is missing")]
    MissingQuery,

    #[error("no candidates provided for ranking")]
    NoCandidates,

    #[error("{kind} document at position {position} has an empty id")]
    EmptyDocumentId { kind: DocumentKind, position: usize },

    #[error("document {id} is a {actual}, expected a {expected}")]
    WrongKind {
        id: DocumentId,
        expected: DocumentKind,
        actual: DocumentKind,
    },

    #[error("candidate {id} appears more than once")]
    DuplicateCandidate { id: DocumentId },

    #[error("{stage} encoding failed{}: {source}", fmt_document(.document_id))]
    Encoding {
        stage: EncodeStage,
        document_id: Option<DocumentId>,
        #[source]
        source: EmbeddingError,
    },

    #[error("ranking timed out after {limit_ms} ms")]
    Timeout { limit_ms: u64 },

    #[error("ranking worker failed: {reason}")]
    Worker { reason: String },
}

fn fmt_document(id: &Option<DocumentId>) -> String {
    match id {
        Some(id) => format!(" for document {}", id),
        None => String::new(),
    }
}

impl RankingError {
    pub(crate) fn encoding(
        stage: EncodeStage,
        document_id: Option<DocumentId>,
        source: EmbeddingError,
    ) -> Self {
        RankingError::Encoding {
            stage,
            document_id,
            source,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            RankingError::MissingQuery
            | RankingError::NoCandidates
            | RankingError::EmptyDocumentId { .. }
            | RankingError::WrongKind { .. }
            | RankingError::DuplicateCandidate { .. } => ErrorClass::InvalidInput,
            RankingError::Encoding { source, .. } if source.is_invalid_input() => {
                ErrorClass::InvalidInput
            }
            RankingError::Encoding { source, .. } if source.is_initialization() => {
                ErrorClass::Initialization
            }
            RankingError::Encoding { .. } | RankingError::Worker { .. } => ErrorClass::Encoding,
            RankingError::Timeout { .. } => ErrorClass::Timeout,
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        self.class() == ErrorClass::InvalidInput
    }
}

pub type RankingResult<T> = Result<T, RankingError>;
