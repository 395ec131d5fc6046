//! Raw payloads returned by the Hacker News API.

use serde::{Deserialize, Serialize};

/// Identifier of a Hacker News item.
pub type StoryId = u64;

/// An item from `item/{id}.json`. Fields absent from the payload take their default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HackerNewsStory {
    pub id: StoryId,
    pub title: String,
    pub url: String,
    pub by: String,
    pub dead: bool,
    /// Unix timestamp in seconds.
    pub time: i64,
    pub score: i32,
    /// Total comment count.
    pub descendants: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_full_item() {
        let json = r#"{
            "by": "dhouston",
            "descendants": 71,
            "id": 8863,
            "kids": [9224, 8917],
            "score": 104,
            "time": 1175714200,
            "title": "My YC app: Dropbox - Throw away your USB drive",
            "type": "story",
            "url": "http://www.getdropbox.com/u/2/screencast.html"
        }"#;

        let story: HackerNewsStory = serde_json::from_str(json).unwrap();
        assert_eq!(story.id, 8863);
        assert_eq!(story.by, "dhouston");
        assert_eq!(story.descendants, 71);
        assert_eq!(story.score, 104);
        assert_eq!(story.time, 1175714200);
        assert!(!story.dead);
    }

    #[test]
    fn missing_fields_default() {
        // Ask HN posts carry no url; job posts carry no descendants.
        let story: HackerNewsStory = serde_json::from_str(r#"{"id": 1, "dead": true}"#).unwrap();
        assert_eq!(story.id, 1);
        assert!(story.dead);
        assert_eq!(story.url, "");
        assert_eq!(story.descendants, 0);
    }
}
