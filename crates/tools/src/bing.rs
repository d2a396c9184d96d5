//! Bing Web Search v7 adapter.

use std::time::Duration;

use askrelay_core::error::SearchError;
use askrelay_core::search::{SearchOptions, SearchProvider, SearchResult};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

pub struct BingSearch {
    api_key: Option<String>,
    endpoint: String,
    client: reqwest::Client,
}

impl BingSearch {
    pub fn new(
        api_key: Option<String>,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            api_key: crate::credential(api_key),
            endpoint: endpoint.to_string(),
            client: crate::http_client(timeout)?,
        })
    }
}

#[async_trait]
impl SearchProvider for BingSearch {
    fn name(&self) -> &str {
        "bing"
    }

    async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SearchError::NotConfigured("missing BING_SEARCH_KEY".into()))?;

        let count = options.num_results.to_string();
        let mut params = vec![
            ("q", query),
            ("count", count.as_str()),
            ("mkt", "en-US"),
            ("safeSearch", "Off"),
        ];
        if options.only_recent {
            params.push(("freshness", "Day"));
        }

        debug!(query, only_recent = options.only_recent, "Bing search");

        let response = self
            .client
            .get(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", api_key)
            .query(&params)
            .send()
            .await
            .map_err(|e| crate::map_send_error("bing", e))?;

        let body: BingResponse = crate::check_status("bing", response)
            .await?
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        Ok(body
            .web_pages
            .map(|pages| pages.value)
            .or(body.value)
            .unwrap_or_default()
            .into_iter()
            .map(|item| SearchResult {
                title: item.name,
                link: item.url,
                snippet: item.snippet.or(item.description).unwrap_or_default(),
            })
            .collect())
    }
}

// Bing nests hits under `webPages.value`; some proxies flatten them to `value`.
#[derive(Debug, Deserialize)]
struct BingResponse {
    #[serde(default, rename = "webPages")]
    web_pages: Option<BingPages>,
    #[serde(default)]
    value: Option<Vec<BingItem>>,
}

#[derive(Debug, Deserialize)]
struct BingPages {
    #[serde(default)]
    value: Vec<BingItem>,
}

#[derive(Debug, Deserialize)]
struct BingItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let bing = BingSearch::new(None, "http://127.0.0.1:9/search", TIMEOUT).unwrap();
        let err = bing
            .search("news", SearchOptions::recent())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn recent_search_sends_freshness_and_maps_fields() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v7.0/search")
                    .query_param("q", "news")
                    .query_param("count", "5")
                    .query_param("freshness", "Day");
                then.status(200).json_body(json!({
                    "webPages": {"value": [
                        {"name": "Headline A", "url": "https://a.example", "snippet": "first"},
                        {"name": "Headline B", "url": "https://b.example", "snippet": "second"}
                    ]}
                }));
            })
            .await;

        let bing = BingSearch::new(Some("key".into()), &server.url("/v7.0/search"), TIMEOUT)
            .unwrap();
        let results = bing
            .search("news", SearchOptions::recent())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Headline A");
        assert_eq!(results[0].link, "https://a.example");
        assert_eq!(results[1].snippet, "second");
    }

    #[tokio::test]
    async fn flat_value_with_description_is_accepted() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200).json_body(json!({
                    "value": [{"name": "T", "url": "https://t.example", "description": "d"}]
                }));
            })
            .await;

        let bing = BingSearch::new(Some("key".into()), &server.url("/search"), TIMEOUT).unwrap();
        let results = bing.search("q", SearchOptions::default()).await.unwrap();
        assert_eq!(results[0].snippet, "d");
    }

    #[tokio::test]
    async fn snippet_wins_over_description() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200).json_body(json!({
                    "webPages": {"value": [
                        {"name": "T", "url": "https://t.example", "snippet": "s", "description": "d"},
                        {"name": "U", "url": "https://u.example"}
                    ]}
                }));
            })
            .await;

        let bing = BingSearch::new(Some("key".into()), &server.url("/search"), TIMEOUT).unwrap();
        let results = bing.search("q", SearchOptions::default()).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].snippet, "s");
        assert_eq!(results[1].snippet, "");
    }

    #[tokio::test]
    async fn slow_upstream_is_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .json_body(json!({"value": []}));
            })
            .await;

        let bing = BingSearch::new(
            Some("key".into()),
            &server.url("/search"),
            Duration::from_secs(1),
        )
        .unwrap();
        let err = bing
            .search("q", SearchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn empty_payload_is_empty_result() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200).json_body(json!({}));
            })
            .await;

        let bing = BingSearch::new(Some("key".into()), &server.url("/search"), TIMEOUT).unwrap();
        let results = bing.search("q", SearchOptions::default()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn upstream_error_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(403).body("quota exceeded");
            })
            .await;

        let bing = BingSearch::new(Some("key".into()), &server.url("/search"), TIMEOUT).unwrap();
        let err = bing
            .search("q", SearchOptions::default())
            .await
            .unwrap_err();
        match err {
            SearchError::ApiError {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 403);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
