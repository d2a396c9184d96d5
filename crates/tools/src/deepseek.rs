//! DeepSeek search adapter.
//!
//! DeepSeek has no recency filter, so `only_recent` is ignored.

use std::time::Duration;

use askrelay_core::error::SearchError;
use askrelay_core::search::{SearchOptions, SearchProvider, SearchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub struct DeepSeekSearch {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl DeepSeekSearch {
    pub fn new(
        api_key: Option<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            api_key: crate::credential(api_key),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: crate::http_client(timeout)?,
        })
    }
}

#[async_trait]
impl SearchProvider for DeepSeekSearch {
    fn name(&self) -> &str {
        "deepseek"
    }

    async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SearchError::NotConfigured("missing DEEPSEEK_API_KEY".into()))?;

        debug!(query, num_results = options.num_results, "DeepSeek search");

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(api_key)
            .json(&DeepSeekRequest {
                query,
                page_size: options.num_results,
            })
            .send()
            .await
            .map_err(|e| crate::map_send_error("deepseek", e))?;

        let body: DeepSeekResponse = crate::check_status("deepseek", response)
            .await?
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        Ok(body
            .hits
            .unwrap_or_default()
            .into_iter()
            .map(|hit| SearchResult {
                title: hit.title,
                link: hit.url,
                snippet: hit.snippet,
            })
            .collect())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeepSeekRequest<'a> {
    query: &'a str,
    page_size: usize,
}

#[derive(Debug, Deserialize)]
struct DeepSeekResponse {
    // `null` and absent both mean no hits.
    #[serde(default)]
    hits: Option<Vec<DeepSeekHit>>,
}

#[derive(Debug, Deserialize)]
struct DeepSeekHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippet: String,
}
