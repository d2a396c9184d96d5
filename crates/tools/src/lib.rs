//! Web-search adapters for askrelay.
//!
//! Each vendor implements `askrelay_core::SearchProvider`:
//! - [`bing::BingSearch`]: Bing Web Search v7
//! - [`google::GoogleSearch`]: Google Custom Search JSON API
//! - [`deepseek::DeepSeekSearch`]: DeepSeek search, used for deep insights
//!   and the passthrough model
//!
//! Credentials are captured from configuration at construction time; an
//! adapter without credentials still builds and fails fast on `search()`.

pub mod bing;
pub mod deepseek;
pub mod google;

use std::sync::Arc;
use std::time::Duration;

use askrelay_config::{AppConfig, SearchBackend};
use askrelay_core::error::SearchError;
use askrelay_core::search::SearchProvider;

pub use bing::BingSearch;
pub use deepseek::DeepSeekSearch;
pub use google::GoogleSearch;

/// Build the adapter answering freshness searches, or `None` when searching
/// is switched off.
pub fn build_search_provider(
    config: &AppConfig,
) -> Result<Option<Arc<dyn SearchProvider>>, SearchError> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let search = &config.search;

    let provider: Arc<dyn SearchProvider> = match search.provider {
        SearchBackend::Bing => Arc::new(BingSearch::new(
            search.bing.api_key.clone(),
            &search.bing.endpoint,
            timeout,
        )?),
        SearchBackend::Google => Arc::new(GoogleSearch::new(
            search.google.api_key.clone(),
            search.google.cse_id.clone(),
            &search.google.endpoint,
            timeout,
        )?),
        SearchBackend::DeepSeek => Arc::new(build_deep_search(config)?),
        SearchBackend::None => return Ok(None),
    };

    Ok(Some(provider))
}

/// Build the DeepSeek adapter used for deep insights and passthrough replies.
pub fn build_deep_search(config: &AppConfig) -> Result<DeepSeekSearch, SearchError> {
    DeepSeekSearch::new(
        config.search.deepseek.api_key.clone(),
        &config.search.deepseek.api_url,
        Duration::from_secs(config.request_timeout_secs),
    )
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SearchError::NotConfigured(format!("HTTP client: {e}")))
}

fn map_send_error(provider: &str, e: reqwest::Error) -> SearchError {
    if e.is_timeout() {
        SearchError::Timeout(format!("{provider}: {e}"))
    } else {
        SearchError::Network(format!("{provider}: {e}"))
    }
}

/// Turn a non-2xx response into a `SearchError`, passing 2xx through.
async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, SearchError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status_code = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(provider, status = status_code, body = %body, "Search provider returned error");
    Err(SearchError::ApiError {
        status_code,
        message: body,
    })
}

/// Treat a missing or blank credential as absent.
fn credential(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_google() {
        let provider = build_search_provider(&AppConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(provider.name(), "google");
    }

    #[test]
    fn backend_none_disables_search() {
        let mut config = AppConfig::default();
        config.search.provider = SearchBackend::None;
        assert!(build_search_provider(&config).unwrap().is_none());
    }

    #[test]
    fn each_backend_maps_to_its_adapter() {
        let mut config = AppConfig::default();
        for (backend, name) in [
            (SearchBackend::Bing, "bing"),
            (SearchBackend::Google, "google"),
            (SearchBackend::DeepSeek, "deepseek"),
        ] {
            config.search.provider = backend;
            let provider = build_search_provider(&config).unwrap().unwrap();
            assert_eq!(provider.name(), name);
        }
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        assert_eq!(credential(Some("  ".into())), None);
        assert_eq!(credential(Some(" k ".into())).as_deref(), Some("k"));
        assert_eq!(credential(None), None);
    }
}
