//! `HackerNewsApi` against a local stub upstream.

mod helpers;

use axum::http::StatusCode;
use beststories::hackernews::{HackerNewsApi, HackerNewsError, StoryClient};
use helpers::{StubUpstream, story_json};
use std::time::Duration;
use url::Url;

#[tokio::test]
async fn best_stories_returns_ranked_ids() {
    let stub = StubUpstream::spawn([("beststories.json", StatusCode::OK, "[3, 1, 2]")]).await;

    let ids = stub.api().best_stories().await.unwrap();

    assert_eq!(ids, Some(vec![3, 1, 2]));
    assert_eq!(stub.hits("beststories.json"), 1);
}

#[tokio::test]
async fn null_ranking_is_none() {
    let stub = StubUpstream::spawn([("beststories.json", StatusCode::OK, "null")]).await;

    assert_eq!(stub.api().best_stories().await.unwrap(), None);
}

#[tokio::test]
async fn story_is_decoded_ignoring_unknown_fields() {
    let stub = StubUpstream::spawn([(
        "item/8863.json",
        StatusCode::OK,
        story_json(8863, "My YC app: Dropbox", 1_175_714_200),
    )])
    .await;

    let story = stub.api().story(8863).await.unwrap().unwrap();

    assert_eq!(story.id, 8863);
    assert_eq!(story.title, "My YC app: Dropbox");
    assert_eq!(story.url, "https://example.com/8863");
    assert_eq!(story.by, "author8863");
    assert_eq!(story.time, 1_175_714_200);
    assert_eq!(story.score, 886_300);
    assert_eq!(story.descendants, 88_630);
}

#[tokio::test]
async fn null_story_is_none() {
    let stub = StubUpstream::spawn([("item/5.json", StatusCode::OK, "null")]).await;

    assert!(stub.api().story(5).await.unwrap().is_none());
}

#[tokio::test]
async fn error_status_is_reported() {
    let stub =
        StubUpstream::spawn([("item/7.json", StatusCode::INTERNAL_SERVER_ERROR, "oops")]).await;

    let error = stub.api().story(7).await.unwrap_err();

    match error {
        HackerNewsError::Status { status, url } => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/v0/item/7.json"), "unexpected url {url}");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_parse_failure() {
    let stub =
        StubUpstream::spawn([("beststories.json", StatusCode::OK, r#"{"not": "a list"}"#)]).await;

    let error = stub.api().best_stories().await.unwrap_err();

    assert!(
        matches!(error, HackerNewsError::ParseFailed { status: 200, .. }),
        "expected parse failure, got {error:?}"
    );
}

#[tokio::test]
async fn base_url_without_trailing_slash_keeps_its_path() {
    let stub = StubUpstream::spawn([("beststories.json", StatusCode::OK, "[1]")]).await;
    let trimmed = stub.base_url.as_str().trim_end_matches('/');

    let api = HackerNewsApi::new(Url::parse(trimmed).unwrap(), Duration::from_secs(5)).unwrap();

    assert_eq!(api.best_stories().await.unwrap(), Some(vec![1]));
    assert_eq!(stub.hits("beststories.json"), 1);
}
