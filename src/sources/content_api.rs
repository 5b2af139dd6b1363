//! REST client for the headless content API backend.
//!
//! Speaks the Directus wire dialect: collections live under
//! `/items/{collection}`, pagination is page-numbered, and responses
//! come back as `{ data: [...], meta: { total_count } }`. The shared
//! paginator works in offsets, so the page number is derived from the
//! offset here.

use serde::Deserialize;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::record::{Collected, Page, PageLimits, Record};
use crate::services::paginate;

/// Client bound to one content API deployment.
#[derive(Debug, Clone)]
pub struct ContentApi {
    http: reqwest::Client,
    base_url: String,
    limits: PageLimits,
}

/// Wire shape of an item listing.
#[derive(Debug, Deserialize)]
struct ItemList {
    #[serde(default)]
    data: Vec<Record>,
    #[serde(default)]
    meta: Option<ItemMeta>,
}

#[derive(Debug, Deserialize)]
struct ItemMeta {
    #[serde(default)]
    total_count: Option<u64>,
}

impl ContentApi {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            http,
            base_url: config.content_api_url.trim_end_matches('/').to_string(),
            limits: config.page_limits(),
        }
    }

    /// Fetch every item in a collection via exhaustive pagination.
    pub async fn list_items_all(&self, collection: &str) -> Result<Collected, AppError> {
        let url = format!("{}/items/{}", self.base_url, collection);
        paginate::collect_all(&self.limits, |offset, limit| {
            // Offsets are always whole pages here because the paginator
            // advances by the returned count and this remote never
            // returns a short page mid-stream.
            let page_number = offset / limit + 1;
            self.fetch_page(&url, page_number, limit)
        })
        .await
    }

    /// Fetch a collection in a single unpaginated request, for small
    /// reference lists served whole.
    pub async fn list_items(&self, collection: &str) -> Result<Vec<Record>, AppError> {
        let url = format!("{}/items/{}", self.base_url, collection);
        let response = self.http.get(&url).send().await?;
        let response = super::check_status(&url, response).await?;
        let list: ItemList = response.json().await?;
        Ok(list.data)
    }

    /// Liveness probe against the server ping endpoint.
    pub async fn ping(&self) -> Result<(), AppError> {
        let url = format!("{}/server/ping", self.base_url);
        let response = self.http.get(&url).send().await?;
        super::check_status(&url, response).await?;
        Ok(())
    }

    async fn fetch_page(&self, url: &str, page: usize, limit: usize) -> Result<Page, AppError> {
        let response = self
            .http
            .get(url)
            .query(&[
                ("page", page.to_string()),
                ("limit", limit.to_string()),
                ("meta", "total_count".to_string()),
            ])
            .send()
            .await?;
        let response = super::check_status(url, response).await?;
        let list: ItemList = response.json().await?;
        Ok(Page {
            records: list.data,
            total: list.meta.and_then(|m| m.total_count),
        })
    }
}
