//! HTTP error responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cafe_core::CafeError;
use serde_json::json;
use thiserror::Error;

/// Failure of a single request, rendered as a JSON error body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    /// Escalated store failure; never retried.
    #[error(transparent)]
    Internal(CafeError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Internal(CafeError::ConcurrencyConflict { .. }) => "concurrency_conflict",
            ApiError::Internal(_) => "store_failure",
        }
    }

    /// Missing collection reads as not-found; everything else escalates.
    pub fn from_store(e: CafeError) -> Self {
        if e.is_collection_unavailable() {
            ApiError::NotFound
        } else {
            ApiError::Internal(e)
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            tracing::error!("Request failed: {}", e);
        }

        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::BadRequest("id mismatch".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(CafeError::ConcurrencyConflict { id: 1 }).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_collection_reads_as_not_found() {
        let err = ApiError::from_store(CafeError::CollectionUnavailable("no such table".into()));
        assert!(matches!(err, ApiError::NotFound));

        let err = ApiError::from_store(CafeError::Database("disk I/O error".into()));
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
