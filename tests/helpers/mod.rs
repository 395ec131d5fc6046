//! A local stand-in for the Hacker News API.

#![allow(dead_code)]

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use beststories::hackernews::HackerNewsApi;
use beststories::state::AppState;
use beststories::stories::{StoryService, StorySettings};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

#[derive(Clone)]
struct Stub {
    responses: Arc<HashMap<String, (StatusCode, String)>>,
    hits: Arc<DashMap<String, usize>>,
}

/// Serves canned JSON under `/v0/` and counts hits per path.
pub struct StubUpstream {
    pub base_url: Url,
    hits: Arc<DashMap<String, usize>>,
    server: JoinHandle<()>,
}

impl StubUpstream {
    /// Start a stub on an ephemeral port. Paths are relative to `/v0/`, e.g. `item/1.json`.
    /// Unknown paths answer 404.
    pub async fn spawn<P, B>(responses: impl IntoIterator<Item = (P, StatusCode, B)>) -> Self
    where
        P: Into<String>,
        B: Into<String>,
    {
        let responses = responses
            .into_iter()
            .map(|(path, status, body)| (path.into(), (status, body.into())))
            .collect();
        let stub = Stub {
            responses: Arc::new(responses),
            hits: Arc::new(DashMap::new()),
        };
        let hits = Arc::clone(&stub.hits);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(respond).with_state(stub);
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}/v0/")).unwrap(),
            hits,
            server,
        }
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits.get(path).map(|count| *count).unwrap_or(0)
    }

    pub fn api(&self) -> HackerNewsApi {
        HackerNewsApi::new(self.base_url.clone(), Duration::from_secs(5)).unwrap()
    }

    /// App state backed by this stub with generous TTLs and no fan-out cap.
    pub fn app_state(&self) -> AppState {
        let settings = StorySettings {
            story_ttl: Duration::from_secs(60),
            story_list_ttl: Duration::from_secs(60),
            fanout_concurrency: None,
        };
        AppState::new(StoryService::new(Arc::new(self.api()), settings))
    }
}

impl Drop for StubUpstream {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn respond(State(stub): State<Stub>, uri: Uri) -> Response {
    let path = uri.path().trim_start_matches("/v0/").to_owned();
    *stub.hits.entry(path.clone()).or_default() += 1;
    match stub.responses.get(&path) {
        Some((status, body)) => (
            *status,
            [(header::CONTENT_TYPE, "application/json")],
            body.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Item JSON shaped like the real API's story payload.
pub fn story_json(id: u64, title: &str, time: i64) -> String {
    serde_json::json!({
        "by": format!("author{id}"),
        "descendants": id * 10,
        "id": id,
        "kids": [id + 1000],
        "score": id * 100,
        "time": time,
        "title": title,
        "type": "story",
        "url": format!("https://example.com/{id}"),
    })
    .to_string()
}
