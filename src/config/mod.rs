use std::env;

use crate::models::record::PageLimits;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub docstore_endpoint: String,
    pub docstore_project_id: String,
    pub docstore_database_id: String,
    pub docstore_api_key: String,
    pub content_api_url: String,
    pub users_collection_id: Option<String>,
    pub host: String,
    pub port: u16,
    pub page_size: usize,
    pub max_page_attempts: u32,
    pub max_page_offset: usize,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            docstore_endpoint: env::var("DOCSTORE_ENDPOINT")?,
            docstore_project_id: env::var("DOCSTORE_PROJECT_ID")?,
            docstore_database_id: env::var("DOCSTORE_DATABASE_ID")?,
            docstore_api_key: env::var("DOCSTORE_API_KEY").unwrap_or_default(),
            content_api_url: env::var("CONTENT_API_URL")?,
            users_collection_id: env::var("USERS_COLLECTION_ID").ok(),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            page_size: env::var("UPSTREAM_PAGE_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),
            max_page_attempts: env::var("UPSTREAM_MAX_PAGE_ATTEMPTS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),
            max_page_offset: env::var("UPSTREAM_MAX_PAGE_OFFSET")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .unwrap_or(10_000),
            refresh_interval_secs: env::var("REFRESH_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        })
    }

    /// Pagination safety ceilings shared by both upstream clients.
    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            page_size: self.page_size,
            max_attempts: self.max_page_attempts,
            max_offset: self.max_page_offset,
        }
    }
}
