//! Search provider trait: the abstraction over web-search backends.
//!
//! Every vendor (Bing, Google Custom Search, DeepSeek) is wrapped behind the
//! same `search(query, options)` contract so the pipeline can augment a
//! prompt without knowing where the snippets came from.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Default number of results requested from a search provider.
pub const DEFAULT_NUM_RESULTS: usize = 5;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Per-call search options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Ask the provider to restrict results to the last 24 hours.
    pub only_recent: bool,

    /// How many results to request.
    pub num_results: usize,
}

impl SearchOptions {
    pub fn recent() -> Self {
        Self {
            only_recent: true,
            ..Self::default()
        }
    }

    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results;
        self
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            only_recent: false,
            num_results: DEFAULT_NUM_RESULTS,
        }
    }
}

/// The core search trait.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// A human-readable name (e.g., "bing", "google", "deepseek").
    fn name(&self) -> &str;

    /// Run one search. An empty result set is `Ok(vec![])`, not an error.
    async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> std::result::Result<Vec<SearchResult>, SearchError>;
}
