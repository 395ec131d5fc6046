//! Best-stories HTTP handlers.

use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use std::time::{Duration, Instant};
use tracing::warn;

use crate::state::AppState;
use crate::stories::Story;
use crate::utils::elapsed_warn_slow;
use crate::web::error::ApiError;

/// Count used by `GET /api/stories`.
const DEFAULT_COUNT: i64 = 5;

const SLOW_REQUEST: Duration = Duration::from_secs(2);

/// `GET /api/stories/{count}`
pub(super) async fn best_stories(
    State(state): State<AppState>,
    count: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Story>>, ApiError> {
    let Path(count) = count.map_err(|rejection| ApiError::invalid_count(rejection.body_text()))?;
    respond(&state, count).await
}

/// `GET /api/stories`
pub(super) async fn default_best_stories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Story>>, ApiError> {
    respond(&state, DEFAULT_COUNT).await
}

async fn respond(state: &AppState, count: i64) -> Result<Json<Vec<Story>>, ApiError> {
    let started = Instant::now();
    let stories = state.stories.best_stories(count).await.map_err(|e| {
        warn!(count, error = ?e, "Failed to retrieve best stories");
        ApiError::from(e)
    })?;
    elapsed_warn_slow("best_stories", started, SLOW_REQUEST);
    Ok(Json(stories))
}
