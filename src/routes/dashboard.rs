//! Dashboard routes: aggregated statistics for the overview page.

use axum::{extract::State, Json};

use crate::errors::{ApiResponse, AppError};
use crate::services::overview::DashboardOverview;
use crate::services::refresh::{self, DashboardSnapshot};
use crate::AppState;

/// GET /api/v1/dashboard/overview. Headline stats, the monthly
/// registration trend, and per-ward rollups.
pub async fn overview(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardOverview>>, AppError> {
    let snapshot = refresh::latest_or_build(&state).await?;
    Ok(ApiResponse::success(snapshot.overview.clone()))
}

/// GET /api/v1/dashboard/snapshot. The full latest snapshot including
/// its generation timestamp.
pub async fn snapshot(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardSnapshot>>, AppError> {
    let snapshot = refresh::latest_or_build(&state).await?;
    Ok(ApiResponse::success(snapshot.as_ref().clone()))
}
