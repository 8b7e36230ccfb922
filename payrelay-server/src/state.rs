//! Application state shared across all request handlers.

use payrelay_core::store::redis::RedisStore;
use payrelay_core::summary::SummaryAggregator;

/// Cloneable handle bundle for the HTTP layer; everything inside is cheap to
/// clone.
#[derive(Clone)]
pub struct AppState {
    /// Shared work queue + accounting index.
    pub store: RedisStore,
    /// Read side over the accounting index.
    pub summary: SummaryAggregator<RedisStore>,
}

impl AppState {
    pub fn new(store: RedisStore) -> Self {
        let summary = SummaryAggregator::new(store.clone());
        Self { store, summary }
    }
}
