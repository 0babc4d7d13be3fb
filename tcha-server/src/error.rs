//! HTTP error type
//!
//! Every handler failure is rendered as `{"error": {"code", "message"}}` with
//! a status derived from the error kind, and logged once here.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::publish::PublishError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or expired session (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller does not own the resource (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Conflict (409), e.g. song already liked
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Malformed or oversized multipart body
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Publish workflow failure (carries the failed state and orphans)
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// tcha-common error
    #[error(transparent)]
    Common(#[from] tcha_common::Error),
}

/// Status and machine-readable code for a common error
fn classify(err: &tcha_common::Error) -> (StatusCode, &'static str) {
    use tcha_common::Error;

    match err {
        Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        Error::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        Error::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        Error::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        Error::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
        Error::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        Error::Serialization(_) | Error::Config(_) | Error::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.classify().0
    }

    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Multipart(err) => {
                let status = err.status();
                if status == StatusCode::PAYLOAD_TOO_LARGE {
                    (status, "PAYLOAD_TOO_LARGE")
                } else {
                    (status, "BAD_REQUEST")
                }
            }
            ApiError::Publish(err) => classify(&err.source),
            ApiError::Common(err) => classify(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.classify();

        let message = match &self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg.clone(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), code = error_code, "{}", message);
        } else {
            warn!(status = status.as_u16(), code = error_code, "{}", message);
        }

        let body = match &self {
            ApiError::Publish(err) => json!({
                "error": {
                    "code": error_code,
                    "message": message,
                    "failedAt": err.failed_at,
                    "orphans": err.orphans,
                }
            }),
            _ => json!({
                "error": {
                    "code": error_code,
                    "message": message,
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_error_status_mapping() {
        let cases = [
            (tcha_common::Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (tcha_common::Error::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (tcha_common::Error::Unauthenticated("x".into()), StatusCode::UNAUTHORIZED),
            (tcha_common::Error::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (tcha_common::Error::Conflict("x".into()), StatusCode::CONFLICT),
            (
                tcha_common::Error::PayloadTooLarge { size: 2, limit: 1 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (tcha_common::Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::BadRequest("Title is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(body["error"]["message"], "Title is required");
    }
}
