use std::sync::Arc;
use std::time::Duration;

use ranker::embedding::TextEncoder;
use ranker::ranking::RankingEngine;
use ranker::storage::RankingStore;

pub struct HandlerState<E: TextEncoder + 'static> {
    pub engine: RankingEngine<E>,

    pub store: Arc<dyn RankingStore>,

    /// Bound on one ranking call; `None` waits indefinitely.
    pub embed_timeout: Option<Duration>,
}

impl<E: TextEncoder + 'static> Clone for HandlerState<E> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            store: Arc::clone(&self.store),
            embed_timeout: self.embed_timeout,
        }
    }
}

impl<E: TextEncoder + 'static> HandlerState<E> {
    pub fn new(
        engine: RankingEngine<E>,
        store: Arc<dyn RankingStore>,
        embed_timeout: Option<Duration>,
    ) -> Self {
        Self {
            engine,
            store,
            embed_timeout,
        }
    }
}
