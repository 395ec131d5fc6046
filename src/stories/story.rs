use crate::hackernews::HackerNewsStory;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A story as served to API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub title: String,
    pub uri: String,
    pub posted_by: String,
    pub time: DateTime<Utc>,
    pub score: i32,
    pub comment_count: i32,
}

impl From<HackerNewsStory> for Story {
    fn from(item: HackerNewsStory) -> Self {
        Self {
            title: item.title,
            uri: item.url,
            posted_by: item.by,
            // Out-of-range timestamps fall back to the epoch.
            time: DateTime::from_timestamp(item.time, 0).unwrap_or_default(),
            score: item.score,
            comment_count: item.descendants,
        }
    }
}
