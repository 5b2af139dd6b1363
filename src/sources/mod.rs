//! Clients for the two remote data backends.

pub mod content_api;
pub mod document_store;

use crate::errors::AppError;

/// Turn a non-2xx upstream response into a transport error carrying the
/// endpoint and status.
pub(crate) async fn check_status(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    Err(AppError::Upstream {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        detail,
    })
}
