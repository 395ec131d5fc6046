use crate::hackernews::StoryId;
use std::fmt;

/// Identifies one cached upstream resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The ranked list of best story ids.
    BestStories,
    /// A single story item.
    Story(StoryId),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::BestStories => f.write_str("best-stories"),
            CacheKey::Story(id) => write!(f, "story:{id}"),
        }
    }
}
