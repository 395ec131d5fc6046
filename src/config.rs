//! Environment-driven configuration.

use anyhow::Context;
use figment::Figment;
use figment::providers::Env;
use fundu::{DurationParser, TimeUnit};
use serde::{Deserialize, Deserializer};
use std::num::NonZeroUsize;
use std::time::Duration;
use url::Url;

use crate::stories::StorySettings;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port for the web server.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Level for this crate's log events; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Root of the Hacker News API, e.g. `https://hacker-news.firebaseio.com/v0/`.
    pub hacker_news_base_url: Url,
    /// How long a fetched story is cached.
    #[serde(deserialize_with = "deserialize_duration")]
    pub story_ttl: Duration,
    /// How long the ranked best-stories list is cached.
    #[serde(deserialize_with = "deserialize_duration")]
    pub story_list_ttl: Duration,
    /// Cap on concurrent story fetches per request. Unset means no cap.
    #[serde(default)]
    pub fanout_concurrency: Option<NonZeroUsize>,
    /// Timeout for each upstream HTTP request.
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout: Duration,
    /// How long in-flight HTTP requests get to finish after a shutdown signal.
    #[serde(
        default = "default_shutdown_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub shutdown_timeout: Duration,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(8)
}

impl Config {
    /// Load from the process environment (`STORY_TTL`, `HACKER_NEWS_BASE_URL`, ...).
    pub fn load() -> anyhow::Result<Self> {
        Self::from_figment(Figment::new().merge(Env::raw()))
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        figment.extract().context("Failed to load config")
    }

    pub fn story_settings(&self) -> StorySettings {
        StorySettings {
            story_ttl: self.story_ttl,
            story_list_ttl: self.story_list_ttl,
            fanout_concurrency: self.fanout_concurrency,
        }
    }
}

/// Parse a duration such as `90`, `500ms`, `30s`, `5m` or `1h`. Bare numbers are seconds.
pub fn parse_duration(text: &str) -> Result<Duration, String> {
    let parser = DurationParser::with_time_units(&[
        TimeUnit::MilliSecond,
        TimeUnit::Second,
        TimeUnit::Minute,
        TimeUnit::Hour,
    ]);
    let parsed = parser
        .parse(text.trim())
        .map_err(|e| format!("invalid duration {text:?}: {e}"))?;
    Duration::try_from(parsed).map_err(|e| format!("invalid duration {text:?}: {e}"))
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
    }
}
