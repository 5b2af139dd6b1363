//! REST client for the document database backend.
//!
//! Speaks the Appwrite wire dialect: project and API key go in request
//! headers, list queries are escaped JSON strings in repeated
//! `queries[]` parameters, and document pages come back as
//! `{ documents: [...], total }`. Collection and database ids are
//! accepted with or without their `collection-` / `database-` prefixes.

use serde::Deserialize;
use serde_json::json;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::record::{Collected, Page, PageLimits, Record};
use crate::services::paginate;

/// Client bound to one project and database in the document store.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    database_id: String,
    api_key: String,
    limits: PageLimits,
}

/// Wire shape of a document list page.
#[derive(Debug, Deserialize)]
struct DocumentPage {
    #[serde(default)]
    documents: Vec<Record>,
    #[serde(default)]
    total: Option<u64>,
}

/// Wire shape of the collection listing.
#[derive(Debug, Deserialize)]
struct CollectionList {
    #[serde(default)]
    collections: Vec<Record>,
}

impl DocumentStore {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            http,
            endpoint: config.docstore_endpoint.trim_end_matches('/').to_string(),
            project_id: config.docstore_project_id.clone(),
            database_id: config
                .docstore_database_id
                .trim_start_matches("database-")
                .to_string(),
            api_key: config.docstore_api_key.clone(),
            limits: config.page_limits(),
        }
    }

    /// List all collections in the configured database. Unpaginated:
    /// the listing is small and served whole.
    pub async fn list_collections(&self) -> Result<Vec<Record>, AppError> {
        let url = format!("{}/databases/{}/collections", self.endpoint, self.database_id);
        let response = self
            .http
            .get(&url)
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
            .send()
            .await?;
        let response = super::check_status(&url, response).await?;
        let list: CollectionList = response.json().await?;
        Ok(list.collections)
    }

    /// Fetch every document in a collection via exhaustive offset
    /// pagination.
    pub async fn list_documents(&self, collection_id: &str) -> Result<Collected, AppError> {
        let collection = collection_id.trim_start_matches("collection-");
        let url = format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint, self.database_id, collection
        );
        paginate::collect_all(&self.limits, |offset, limit| {
            self.fetch_page(&url, offset, limit)
        })
        .await
    }

    /// Liveness probe against the store's health endpoint.
    pub async fn ping(&self) -> Result<(), AppError> {
        let url = format!("{}/health", self.endpoint);
        let response = self
            .http
            .get(&url)
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
            .send()
            .await?;
        super::check_status(&url, response).await?;
        Ok(())
    }

    async fn fetch_page(&self, url: &str, offset: usize, limit: usize) -> Result<Page, AppError> {
        // The limit query is always sent; the offset query only past
        // the first page, matching what the server expects.
        let mut queries = vec![(
            "queries[]",
            json!({"method": "limit", "values": [limit]}).to_string(),
        )];
        if offset > 0 {
            queries.push((
                "queries[]",
                json!({"method": "offset", "values": [offset]}).to_string(),
            ));
        }

        let response = self
            .http
            .get(url)
            .query(&queries)
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
            .send()
            .await?;
        let response = super::check_status(url, response).await?;
        let page: DocumentPage = response.json().await?;
        Ok(Page {
            records: page.documents,
            total: page.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(endpoint: &str) -> AppConfig {
        AppConfig {
            docstore_endpoint: endpoint.to_string(),
            docstore_project_id: "proj".to_string(),
            docstore_database_id: "database-db1".to_string(),
            docstore_api_key: "key".to_string(),
            content_api_url: "http://unused.invalid".to_string(),
            users_collection_id: None,
            host: "127.0.0.1".to_string(),
            port: 0,
            page_size: 100,
            max_page_attempts: 100,
            max_page_offset: 10_000,
            refresh_interval_secs: 300,
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn database_prefix_is_stripped() {
        let store = DocumentStore::new(reqwest::Client::new(), &config("http://x/v1/"));
        assert_eq!(store.database_id, "db1");
        assert_eq!(store.endpoint, "http://x/v1");
    }

    #[test]
    fn document_page_tolerates_missing_fields() {
        let page: DocumentPage = serde_json::from_value(json!({})).unwrap();
        assert!(page.documents.is_empty());
        assert_eq!(page.total, None);

        let page: DocumentPage =
            serde_json::from_value(json!({"documents": [{"a": 1}], "total": 7})).unwrap();
        assert_eq!(page.documents.len(), 1);
        assert_eq!(page.total, Some(7));
    }
}
