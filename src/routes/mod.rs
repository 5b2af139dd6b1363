//! Route definitions for the wardlens API.

pub mod dashboard;
pub mod health;
pub mod interests;
pub mod users;

use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/api/v1/dashboard/overview", get(dashboard::overview))
        .route("/api/v1/dashboard/snapshot", get(dashboard::snapshot))
        .route("/api/v1/users/metrics", get(users::metrics))
        .route("/api/v1/interests", get(interests::summary))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
