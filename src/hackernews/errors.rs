//! Error types for the Hacker News API client.

#[derive(Debug, thiserror::Error)]
pub enum HackerNewsError {
    #[error("Invalid Hacker News request path {path:?}")]
    InvalidPath {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Hacker News responded with status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Failed to parse Hacker News response from {url}")]
    ParseFailed {
        status: u16,
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("Request to Hacker News failed")]
    RequestFailed(#[from] reqwest::Error),
}
