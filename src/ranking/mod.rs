//! Ranking of candidate documents against a query.
//!
//! [`RankingEngine::rank`] normalizes text, encodes the query once and the
//! candidates in a single batch, scores every candidate and assigns dense
//! ranks `1..=N`. The result is a [`RankingResultSet`] that persistence layers
//! store with replace-on-rerun semantics.

mod engine;
mod error;
mod types;


pub use engine::RankingEngine;
pub use error::{EncodeStage, ErrorClass, RankingError, RankingResult};
pub use types::{Document, DocumentId, DocumentKind, RankRequest, RankingResultSet, Score};
