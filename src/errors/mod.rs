//! Unified error handling with consistent API response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error detail in the API response envelope.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Consistent JSON envelope for all API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a successful result in the envelope.
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            data: Some(data),
            error: None,
        })
    }

    /// Wrap an error in the envelope.
    pub fn error(code: &str, message: &str) -> Json<Self> {
        Json(Self {
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        })
    }
}

/// Application error type mapping to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream error: {endpoint} returned {status}: {detail}")]
    Upstream {
        endpoint: String,
        status: u16,
        detail: String,
    },

    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Check if this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error originated in one of the remote data backends.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::Http(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Upstream {
                endpoint,
                status,
                detail,
            } => {
                tracing::error!(endpoint = %endpoint, status = %status, detail = %detail, "Upstream error");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    format!("Upstream request to {endpoint} failed with status {status}"),
                )
            }
            AppError::Http(e) => {
                tracing::error!(error = %e, "Upstream request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_UNREACHABLE",
                    "Failed to reach upstream data backend".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()> {
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message,
            }),
        };

        (status, Json(body)).into_response()
    }
}
