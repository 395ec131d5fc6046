//! HTTP access to the Hacker News API.

use crate::hackernews::errors::HackerNewsError;
use crate::hackernews::json::decode;
use crate::hackernews::models::{HackerNewsStory, StoryId};
use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::trace;
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Source of ranked story ids and story items.
///
/// `None` means upstream answered but has no data for the request.
#[async_trait]
pub trait StoryClient: Send + Sync {
    /// The current ranked list of best story ids.
    async fn best_stories(&self) -> Result<Option<Vec<StoryId>>, HackerNewsError>;

    /// A single story item.
    async fn story(&self, id: StoryId) -> Result<Option<HackerNewsStory>, HackerNewsError>;
}

/// Stateless client for `beststories.json` and `item/{id}.json`.
#[derive(Debug, Clone)]
pub struct HackerNewsApi {
    http: reqwest::Client,
    base_url: Url,
}

impl HackerNewsApi {
    pub fn new(base_url: Url, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(http, base_url))
    }

    /// Use an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, mut base_url: Url) -> Self {
        // Without a trailing slash, `Url::join` would replace the last path segment (`/v0`).
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, HackerNewsError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|source| HackerNewsError::InvalidPath {
                path: path.to_string(),
                source,
            })?;

        trace!(url = %url, "GET");
        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HackerNewsError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        decode(&body).map_err(|source| HackerNewsError::ParseFailed {
            status: status.as_u16(),
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl StoryClient for HackerNewsApi {
    async fn best_stories(&self) -> Result<Option<Vec<StoryId>>, HackerNewsError> {
        self.get_json("beststories.json").await
    }

    async fn story(&self, id: StoryId) -> Result<Option<HackerNewsStory>, HackerNewsError> {
        self.get_json(&format!("item/{id}.json")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let api = HackerNewsApi::with_client(
            reqwest::Client::new(),
            Url::parse("https://hacker-news.firebaseio.com/v0").unwrap(),
        );
        assert_eq!(
            api.base_url().join("beststories.json").unwrap().as_str(),
            "https://hacker-news.firebaseio.com/v0/beststories.json"
        );
    }

    #[test]
    fn base_url_with_slash_is_kept() {
        let api = HackerNewsApi::with_client(
            reqwest::Client::new(),
            Url::parse("http://test/").unwrap(),
        );
        assert_eq!(
            api.base_url().join("item/1.json").unwrap().as_str(),
            "http://test/item/1.json"
        );
    }
}
