//! Application state shared across request handlers.

use crate::stories::StoryService;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct AppState {
    pub stories: Arc<StoryService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(stories: StoryService) -> Self {
        Self {
            stories: Arc::new(stories),
            started_at: Instant::now(),
        }
    }

    /// Spawn a background task that drops expired cache entries every `interval`.
    ///
    /// Expired entries are already ignored on lookup; this only bounds memory
    /// held by ids that fell out of the ranking.
    pub fn spawn_cache_purge(&self, interval: Duration) -> JoinHandle<()> {
        let stories = Arc::clone(&self.stories);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // skip the immediate first tick
            loop {
                ticker.tick().await;
                let purged = stories.purge_expired();
                if purged > 0 {
                    let (lists, items) = stories.cached_entries();
                    tracing::debug!(purged, lists, items, "Expired cache entries purged");
                }
            }
        })
    }
}
