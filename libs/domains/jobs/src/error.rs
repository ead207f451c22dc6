use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// The JSON shape returned for every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: i32,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum JobsError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Queue error: {0}")]
    Queue(#[from] stream_worker::StreamError),

    #[error("Capability error: {0}")]
    Capability(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl JobsError {
    fn parts(&self) -> (StatusCode, &'static str, i32) {
        match self {
            JobsError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION", 1001),
            JobsError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", 1004),
            JobsError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", 1008),
            JobsError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE", 1010),
            JobsError::Queue(_) => (StatusCode::SERVICE_UNAVAILABLE, "QUEUE", 1020),
            JobsError::Capability(_) => (StatusCode::BAD_GATEWAY, "CAPABILITY", 1030),
            JobsError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", 1000),
        }
    }
}

impl IntoResponse for JobsError {
    fn into_response(self) -> Response {
        let (status, error, code) = self.parts();
        match &self {
            JobsError::Database(e) => tracing::error!(error_code = code, "database error: {e:?}"),
            JobsError::Queue(e) => tracing::error!(error_code = code, "queue error: {e:?}"),
            JobsError::Internal(msg) => tracing::error!(error_code = code, "internal error: {msg}"),
            JobsError::Capability(msg) => tracing::warn!(error_code = code, "capability error: {msg}"),
            JobsError::Validation(msg) => tracing::info!(error_code = code, "validation error: {msg}"),
            JobsError::NotFound(msg) => tracing::info!(error_code = code, "not found: {msg}"),
            JobsError::Conflict(msg) => tracing::info!(error_code = code, "conflict: {msg}"),
        }

        let body = ErrorResponse {
            code,
            error: error.to_string(),
            message: self.to_string(),
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = JobsError::NotFound("job ABC not found".to_string());
        let (status, error, _code) = err.parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error, "NOT_FOUND");
    }

    #[test]
    fn conflict_maps_to_409() {
        let err = JobsError::Conflict("job already running".to_string());
        let (status, error, _code) = err.parts();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error, "CONFLICT");
    }
}
