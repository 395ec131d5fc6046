//! Web API router construction.

use axum::{Router, routing::get};
use std::time::Duration;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer};

use crate::state::AppState;
use crate::web::error::ApiError;
use crate::web::middleware::request_id::RequestIdLayer;
use crate::web::{status, stories};

/// Upper bound on a single request, including every upstream fetch it waits on.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates the web server router
pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(status::health))
        .route("/status", get(status::status))
        .route("/stories", get(stories::default_best_stories))
        .route("/stories/{count}", get(stories::best_stories))
        .with_state(app_state);

    Router::new()
        .nest("/api", api_router)
        .fallback(not_found)
        .layer((
            // Outermost: per-request ID span + severity-proportional response logging.
            RequestIdLayer,
            CompressionLayer::new()
                .zstd(true)
                .br(true)
                .gzip(true)
                .quality(tower_http::CompressionLevel::Fastest),
            TimeoutLayer::new(REQUEST_TIMEOUT),
        ))
}

async fn not_found() -> ApiError {
    ApiError::not_found("No such endpoint")
}
