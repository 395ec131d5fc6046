//! Best-stories aggregation with request coalescing.
//!
//! One call to [`StoryService::best_stories`] resolves the ranked id list
//! through the list cache, then fans out over the first `count` ids through the
//! item cache. Both caches are single-flight, so overlapping concurrent calls
//! share upstream fetches instead of repeating them.

use crate::cache::{CacheKey, LoadError, Loading, SingleFlightCache};
use crate::hackernews::{HackerNewsError, StoryClient, StoryId};
use crate::stories::Story;
use futures::{StreamExt, TryStreamExt, stream};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Failure surfaced by [`StoryService::best_stories`]; wraps the upstream error unchanged.
pub type StoryError = LoadError<HackerNewsError>;

/// Cache lifetimes and fan-out limit for [`StoryService`].
#[derive(Debug, Clone)]
pub struct StorySettings {
    /// How long a fetched story stays cached.
    pub story_ttl: Duration,
    /// How long the ranked id list stays cached.
    pub story_list_ttl: Duration,
    /// Maximum item fetches in flight per call. `None` fetches every selected id at once.
    pub fanout_concurrency: Option<NonZeroUsize>,
}

pub struct StoryService {
    client: Arc<dyn StoryClient>,
    settings: StorySettings,
    rankings: SingleFlightCache<CacheKey, Arc<[StoryId]>, HackerNewsError>,
    stories: SingleFlightCache<CacheKey, Option<Story>, HackerNewsError>,
}

impl StoryService {
    pub fn new(client: Arc<dyn StoryClient>, settings: StorySettings) -> Self {
        Self {
            client,
            settings,
            rankings: SingleFlightCache::new(),
            stories: SingleFlightCache::new(),
        }
    }

    /// The best `count` stories in ranking order.
    ///
    /// Returns an empty list without touching upstream when `count <= 0`.
    /// Ids that upstream does not know are skipped. Any failed fetch fails the
    /// whole call; no partial list is returned.
    pub async fn best_stories(&self, count: i64) -> Result<Vec<Story>, StoryError> {
        if count <= 0 {
            return Ok(Vec::new());
        }

        let ranking = self.ranking().await?;
        if ranking.is_empty() {
            return Ok(Vec::new());
        }

        let take = usize::try_from(count)
            .unwrap_or(usize::MAX)
            .min(ranking.len());
        let limit = self
            .settings
            .fanout_concurrency
            .map_or(take, NonZeroUsize::get);

        // `buffered` yields in input order regardless of completion order.
        let stories: Vec<Option<Story>> = stream::iter(ranking[..take].iter().copied())
            .map(|id| self.story(id))
            .buffered(limit)
            .try_collect()
            .await?;

        let resolved: Vec<Story> = stories.into_iter().flatten().collect();
        debug!(
            requested = count,
            selected = take,
            resolved = resolved.len(),
            "best stories assembled"
        );
        Ok(resolved)
    }

    fn ranking(&self) -> Loading<Arc<[StoryId]>, HackerNewsError> {
        let client = Arc::clone(&self.client);
        self.rankings.get_or_load(
            CacheKey::BestStories,
            self.settings.story_list_ttl,
            move || async move {
                info!("Retrieving list of best stories");
                let ids = client.best_stories().await?.unwrap_or_default();
                Ok(ids.into())
            },
        )
    }

    fn story(&self, id: StoryId) -> Loading<Option<Story>, HackerNewsError> {
        let client = Arc::clone(&self.client);
        self.stories
            .get_or_load(CacheKey::Story(id), self.settings.story_ttl, move || async move {
                info!(story_id = id, "Retrieving story");
                let story = client.story(id).await?;
                if story.is_none() {
                    debug!(story_id = id, "story not found upstream");
                }
                Ok(story.map(Story::from))
            })
    }

    /// Entries currently held by the list and item caches.
    pub fn cached_entries(&self) -> (usize, usize) {
        (self.rankings.len(), self.stories.len())
    }

    /// Drop expired entries from both caches.
    pub fn purge_expired(&self) -> usize {
        self.rankings.purge_expired() + self.stories.purge_expired()
    }
}
