//! User metrics routes.

use axum::{extract::State, Json};

use crate::errors::{ApiResponse, AppError};
use crate::services::refresh;
use crate::services::users::UserMetrics;
use crate::AppState;

/// GET /api/v1/users/metrics. Registration windows, login activity,
/// and the monthly registration histogram.
pub async fn metrics(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserMetrics>>, AppError> {
    let snapshot = refresh::latest_or_build(&state).await?;
    Ok(ApiResponse::success(snapshot.user_metrics.clone()))
}
