use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::ranking::{DocumentId, RankingResultSet};

use super::{RankingStore, StorageResult, check_not_stale, check_result_set};

/// Result sets kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryRankingStore {
    sets: RwLock<HashMap<DocumentId, RankingResultSet>>,
}

impl MemoryRankingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.read().is_empty()
    }
}

impl RankingStore for MemoryRankingStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn replace(&self, set: RankingResultSet) -> StorageResult<Option<RankingResultSet>> {
        check_result_set(&set)?;

        let query_id = set.query_id.clone();
        let run_id = set.run_id;
        let previous = {
            let mut sets = self.sets.write();
            check_not_stale(sets.get(&query_id), &set)?;
            sets.insert(query_id.clone(), set)
        };

        debug!(
            query_id = %query_id,
            run_id = %run_id,
            superseded = previous.is_some(),
            "Result set stored"
        );
        Ok(previous)
    }

    fn get(&self, query_id: &DocumentId) -> StorageResult<Option<RankingResultSet>> {
        Ok(self.sets.read().get(query_id).cloned())
    }

    fn remove(&self, query_id: &DocumentId) -> StorageResult<bool> {
        Ok(self.sets.write().remove(query_id).is_some())
    }

    fn query_ids(&self) -> StorageResult<Vec<DocumentId>> {
        let mut ids: Vec<DocumentId> = self.sets.read().keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
