//! Typed API error for HTTP handlers.
//!
//! Converts domain errors into HTTP responses. Refused sessions get the fixed
//! plain-text body the player expects; everything else is JSON.

use axum::Json;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use scorm_sync_service::ServiceError;
use scorm_sync_storage::StorageError;

pub const FORBIDDEN_BODY: &str = "not allowed";

/// `Internal` logs the real error server-side and returns a static message.
#[derive(Debug)]
pub enum ApiError {
    /// 403, session token missing, expired or mismatched, or a non-local
    /// caller on a local-only route.
    Forbidden,
    /// 404, unknown package, attempt or node.
    NotFound(String),
    /// 500, details logged and not exposed.
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Forbidden => {
                return (StatusCode::FORBIDDEN, [(CONTENT_TYPE, "text/plain")], FORBIDDEN_BODY)
                    .into_response();
            },
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            },
        };
        let body = serde_json::json!({"error": message});
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthorized => Self::Forbidden,
            ServiceError::NotFound { entity, id }
            | ServiceError::Storage(StorageError::NotFound { entity, id }) => {
                Self::NotFound(format!("{entity} '{id}' not found"))
            },
            _ => Self::Internal(err.into()),
        }
    }
}
