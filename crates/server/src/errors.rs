use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use service::errors::ServiceError;

/// Boundary error for the HTTP surface.
///
/// Validation problems surface as a fixed 400 message and are never logged
/// as server faults. Storage failures surface as 500 with the underlying
/// message exposed to the caller verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Name and email are required")]
    Validation,
    #[error("{0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(_) => Self::Validation,
            ServiceError::Storage(msg) => Self::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let msg = self.to_string();
        if status.is_server_error() {
            error!(error = %msg, "request failed");
        }
        (status, Json(serde_json::json!({"error": msg}))).into_response()
    }
}
