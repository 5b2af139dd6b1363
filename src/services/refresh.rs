//! Snapshot construction and the periodic refresh cycle.
//!
//! The whole pipeline rebuilds an immutable [`DashboardSnapshot`] on a
//! fixed interval and swaps it in atomically. The sources are read-only
//! and each run replaces the previous snapshot wholesale, so
//! overlapping or superseded runs need no coordination beyond
//! last-write-wins on the cell.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;

use crate::errors::AppError;
use crate::services::interests::{self, InterestSummary};
use crate::services::overview::{self, DashboardOverview};
use crate::services::users::{self, UserMetrics};
use crate::AppState;

/// One immutable pipeline result.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub overview: DashboardOverview,
    pub user_metrics: UserMetrics,
    pub interests: InterestSummary,
    pub generated_at: DateTime<Utc>,
}

/// Holder for the latest snapshot, shared between the refresh task and
/// request handlers.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCell {
    inner: Arc<RwLock<Option<Arc<DashboardSnapshot>>>>,
}

impl SnapshotCell {
    pub async fn latest(&self) -> Option<Arc<DashboardSnapshot>> {
        self.inner.read().await.clone()
    }

    pub async fn replace(&self, snapshot: DashboardSnapshot) -> Arc<DashboardSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.inner.write().await = Some(Arc::clone(&snapshot));
        snapshot
    }
}

/// Run the full aggregation pipeline once. The three views are
/// independent and fetched concurrently; any primary fetch failing
/// fails the whole run with no partial snapshot.
pub async fn build_snapshot(state: &AppState) -> Result<DashboardSnapshot, AppError> {
    let (overview, user_metrics, interests) = tokio::try_join!(
        overview::build(&state.documents, &state.content),
        users::build(&state.documents, state.config.users_collection_id.as_deref()),
        interests::build(&state.content),
    )?;
    Ok(DashboardSnapshot {
        overview,
        user_metrics,
        interests,
        generated_at: Utc::now(),
    })
}

/// Serve the latest snapshot, building one on demand on a cold start.
pub async fn latest_or_build(state: &AppState) -> Result<Arc<DashboardSnapshot>, AppError> {
    if let Some(snapshot) = state.snapshot.latest().await {
        return Ok(snapshot);
    }
    let snapshot = build_snapshot(state).await?;
    Ok(state.snapshot.replace(snapshot).await)
}

/// Periodic refresh loop. A failed run keeps the previous snapshot and
/// waits for the next tick.
pub async fn run(state: AppState) {
    let period = Duration::from_secs(state.config.refresh_interval_secs.max(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match build_snapshot(&state).await {
            Ok(snapshot) => {
                let snapshot = state.snapshot.replace(snapshot).await;
                tracing::info!(
                    generated_at = %snapshot.generated_at,
                    total_users = snapshot.user_metrics.total_users,
                    "Dashboard snapshot refreshed"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Dashboard refresh failed; keeping previous snapshot");
            }
        }
    }
}
