//! Best-stories aggregation over the Hacker News API.

pub mod service;
pub mod story;

pub use service::{StoryService, StorySettings};
pub use story::Story;
