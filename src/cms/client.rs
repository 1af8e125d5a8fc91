//! CMS HTTP client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::error::{CmsError, CmsResult};
use crate::config::CmsConfig;

/// One page of a paginated listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListPage {
    pub results: Vec<Value>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// Body of a collection query
#[derive(Debug, Clone, Serialize)]
pub struct CollectionQuery {
    pub filter: Value,
    pub sorts: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    pub page_size: usize,
}

impl CollectionQuery {
    /// Published items, newest first
    pub fn published(page_size: usize) -> Self {
        Self {
            filter: published_filter(),
            sorts: vec![json!({ "property": "Date", "direction": "descending" })],
            start_cursor: None,
            page_size,
        }
    }

    /// Published items whose `Slug` equals `slug`
    pub fn by_slug(slug: &str, page_size: usize) -> Self {
        Self {
            filter: json!({
                "and": [
                    { "property": "Slug", "rich_text": { "equals": slug } },
                    published_filter(),
                ]
            }),
            ..Self::published(page_size)
        }
    }

    pub fn after(&self, cursor: Option<String>) -> Self {
        Self {
            start_cursor: cursor,
            ..self.clone()
        }
    }
}

fn published_filter() -> Value {
    json!({ "property": "Published", "checkbox": { "equals": true } })
}

/// Read access to the CMS
///
/// The two calls mirror the two listing endpoints the site consumes.
#[async_trait]
pub trait CmsClient: Send + Sync {
    async fn query_collection(
        &self,
        collection_id: &str,
        query: &CollectionQuery,
    ) -> CmsResult<ListPage>;

    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
        page_size: usize,
    ) -> CmsResult<ListPage>;
}

/// reqwest-backed client for a Notion-compatible API
pub struct HttpCmsClient {
    base_url: String,
    api_version: String,
    token: String,
    client: reqwest::Client,
}

impl HttpCmsClient {
    pub fn new(config: &CmsConfig) -> CmsResult<Self> {
        let token = config
            .token()
            .ok_or_else(|| CmsError::MissingToken(config.token_env.clone()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            token,
            client,
        })
    }

    async fn read_page(response: reqwest::Response) -> CmsResult<ListPage> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CmsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl CmsClient for HttpCmsClient {
    async fn query_collection(
        &self,
        collection_id: &str,
        query: &CollectionQuery,
    ) -> CmsResult<ListPage> {
        let url = format!("{}/databases/{}/query", self.base_url, collection_id);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.api_version)
            .json(query)
            .send()
            .await?;

        Self::read_page(response).await
    }

    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
        page_size: usize,
    ) -> CmsResult<ListPage> {
        let url = format!("{}/blocks/{}/children", self.base_url, block_id);
        tracing::debug!("GET {} (cursor {:?})", url, start_cursor);

        let mut params = vec![("page_size", page_size.to_string())];
        if let Some(cursor) = start_cursor {
            params.push(("start_cursor", cursor.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.api_version)
            .query(&params)
            .send()
            .await?;

        Self::read_page(response).await
    }
}
