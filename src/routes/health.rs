//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub document_store: String,
    pub content_api: String,
}

/// Liveness probe. Returns OK whenever the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe. Checks both upstream backends and reports a
/// degraded status if either is unreachable.
pub async fn ready(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    let (documents, content) = tokio::join!(state.documents.ping(), state.content.ping());

    let document_store = match documents {
        Ok(()) => "connected".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Document store health check failed");
            format!("error: {e}")
        }
    };

    let content_api = match content {
        Ok(()) => "connected".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Content API health check failed");
            format!("error: {e}")
        }
    };

    let status = if document_store == "connected" && content_api == "connected" {
        "ok"
    } else {
        "degraded"
    };

    ApiResponse::success(HealthStatus {
        status: status.to_string(),
        document_store,
        content_api,
    })
}
