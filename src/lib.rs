pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;
pub mod sources;

use std::time::Duration;

use crate::errors::AppError;
use crate::services::refresh::SnapshotCell;
use crate::sources::content_api::ContentApi;
use crate::sources::document_store::DocumentStore;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub documents: DocumentStore,
    pub content: ContentApi,
    pub snapshot: SnapshotCell,
}

impl AppState {
    /// Build the state from configuration. Both upstream clients share
    /// one HTTP connection pool.
    pub fn new(config: config::AppConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            documents: DocumentStore::new(http.clone(), &config),
            content: ContentApi::new(http, &config),
            snapshot: SnapshotCell::default(),
            config,
        })
    }
}
