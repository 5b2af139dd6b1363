//! Ward interest routes.

use axum::{extract::State, Json};

use crate::errors::{ApiResponse, AppError};
use crate::services::interests::InterestSummary;
use crate::services::refresh;
use crate::AppState;

/// GET /api/v1/interests. Ward interest counts, the district
/// breakdown, top wards, and interested councillors.
pub async fn summary(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<InterestSummary>>, AppError> {
    let snapshot = refresh::latest_or_build(&state).await?;
    Ok(ApiResponse::success(snapshot.interests.clone()))
}
