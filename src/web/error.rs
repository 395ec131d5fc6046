//! JSON error responses for the web API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::hackernews::HackerNewsError;
use crate::stories::service::StoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    InvalidCount,
    NotFound,
    UpstreamError,
    UpstreamTimeout,
    InternalError,
}

impl ApiErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidCount => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
            ApiErrorCode::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_count(raw: impl std::fmt::Display) -> Self {
        Self::new(
            ApiErrorCode::InvalidCount,
            format!("Story count must be an integer: {raw}"),
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::NotFound, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::InternalError, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<StoryError> for ApiError {
    fn from(error: StoryError) -> Self {
        match error.inner() {
            Some(HackerNewsError::RequestFailed(e)) if e.is_timeout() => Self::new(
                ApiErrorCode::UpstreamTimeout,
                "Hacker News did not respond in time",
            ),
            Some(upstream) => Self::new(ApiErrorCode::UpstreamError, upstream.to_string()),
            None => Self::internal_error(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LoadError;
    use std::sync::Arc;

    #[test]
    fn upstream_status_maps_to_bad_gateway() {
        let error = LoadError::Failed(Arc::new(HackerNewsError::Status {
            status: 500,
            url: "http://test/beststories.json".to_owned(),
        }));

        let api_error = ApiError::from(error);
        assert_eq!(api_error.code, ApiErrorCode::UpstreamError);
        assert_eq!(api_error.status(), StatusCode::BAD_GATEWAY);
        assert!(api_error.message.contains("500"));
    }

    #[test]
    fn panicked_loader_maps_to_internal_error() {
        let api_error = ApiError::from(StoryError::Panicked);
        assert_eq!(api_error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn serializes_code_in_screaming_case() {
        let json = serde_json::to_value(ApiError::invalid_count("abc")).unwrap();
        assert_eq!(json["code"], "INVALID_COUNT");
    }
}
