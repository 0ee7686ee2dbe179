//! Persistence of ranking result sets.
//!
//! A store holds at most one [`RankingResultSet`] per query. Storing a new set
//! for a query replaces the previous one as a whole; readers never observe a
//! mix of two runs.

/// Store error types.
pub mod error;
/// JSON file per query.
pub mod file;
/// In-process map.
pub mod memory;

#[cfg(test)]
mod tests;

pub use error::{StorageError, StorageResult};
pub use file::FileRankingStore;
pub use memory::MemoryRankingStore;

use std::sync::Arc;

use crate::ranking::{DocumentId, RankingResultSet};

/// Replace-on-rerun storage for result sets.
pub trait RankingStore: Send + Sync {
    /// Short name for logs and readiness output.
    fn kind(&self) -> &'static str;

    /// Validates `set` and swaps it in for its query, returning the superseded set.
    ///
    /// A set ranked before the currently stored one is refused with
    /// [`StorageError::StaleResultSet`], so the newest run wins regardless of
    /// which call finishes first.
    fn replace(&self, set: RankingResultSet) -> StorageResult<Option<RankingResultSet>>;

    fn get(&self, query_id: &DocumentId) -> StorageResult<Option<RankingResultSet>>;

    /// Removes the set for `query_id`; `false` if there was none.
    fn remove(&self, query_id: &DocumentId) -> StorageResult<bool>;

    /// Queries with a stored set, sorted.
    fn query_ids(&self) -> StorageResult<Vec<DocumentId>>;
}

impl<T: RankingStore + ?Sized> RankingStore for Arc<T> {
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn replace(&self, set: RankingResultSet) -> StorageResult<Option<RankingResultSet>> {
        (**self).replace(set)
    }

    fn get(&self, query_id: &DocumentId) -> StorageResult<Option<RankingResultSet>> {
        (**self).get(query_id)
    }

    fn remove(&self, query_id: &DocumentId) -> StorageResult<bool> {
        (**self).remove(query_id)
    }

    fn query_ids(&self) -> StorageResult<Vec<DocumentId>> {
        (**self).query_ids()
    }
}

pub(crate) fn check_result_set(set: &RankingResultSet) -> StorageResult<()> {
    set.validate()
        .map_err(|reason| StorageError::InvalidResultSet {
            query_id: set.query_id.clone(),
            reason,
        })
}

pub(crate) fn check_not_stale(
    stored: Option<&RankingResultSet>,
    set: &RankingResultSet,
) -> StorageResult<()> {
    match stored {
        Some(stored) if stored.ranked_at > set.ranked_at => Err(StorageError::StaleResultSet {
            query_id: set.query_id.clone(),
            run_id: set.run_id,
            stored_run_id: stored.run_id,
        }),
        _ => Ok(()),
    }
}
