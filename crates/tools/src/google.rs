//! Google Custom Search JSON API adapter.

use std::time::Duration;

use askrelay_core::error::SearchError;
use askrelay_core::search::{SearchOptions, SearchProvider, SearchResult};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Google caps `num` at 10 per request.
const MAX_NUM: usize = 10;

pub struct GoogleSearch {
    api_key: Option<String>,
    cse_id: Option<String>,
    endpoint: String,
    client: reqwest::Client,
}

impl GoogleSearch {
    pub fn new(
        api_key: Option<String>,
        cse_id: Option<String>,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            api_key: crate::credential(api_key),
            cse_id: crate::credential(cse_id),
            endpoint: endpoint.to_string(),
            client: crate::http_client(timeout)?,
        })
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    fn name(&self) -> &str {
        "google"
    }

    async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let (Some(key), Some(cx)) = (self.api_key.as_deref(), self.cse_id.as_deref()) else {
            return Err(SearchError::NotConfigured(
                "missing GOOGLE_API_KEY or GOOGLE_CSE_ID".into(),
            ));
        };

        let num = options.num_results.clamp(1, MAX_NUM).to_string();
        let mut params = vec![("key", key), ("cx", cx), ("q", query), ("num", num.as_str())];
        if options.only_recent {
            params.push(("sort", "date"));
            params.push(("dateRestrict", "d1"));
        }

        debug!(query, only_recent = options.only_recent, "Google search");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| crate::map_send_error("google", e))?;

        let body: GoogleResponse = crate::check_status("google", response)
            .await?
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        Ok(body
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| SearchResult {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    // Absent entirely when the query has no hits.
    #[serde(default)]
    items: Option<Vec<GoogleItem>>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}
