//! The ask pipeline.
//!
//! One call to [`AskPipeline::ask`] is one sequential task:
//! validate, classify the last user turn, optionally search, assemble the
//! preamble, then dispatch to the completion provider. Searches finish before
//! assembly starts and nothing is shared between calls except the immutable
//! configuration and the provider handles.

use std::sync::Arc;

use askrelay_config::AppConfig;
use askrelay_core::error::{Error, Result};
use askrelay_core::message::{Message, last_user_message};
use askrelay_core::provider::{CompletionProvider, CompletionRequest};
use askrelay_core::search::{SearchOptions, SearchProvider};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::assembler::{self, DEEP_INSIGHTS_HEADING, Digest, FRESH_RESULTS_HEADING};
use crate::freshness::{self, FreshnessClassifier, KeywordClassifier};

/// Timezone used when the caller does not send one.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Message returned for a missing, empty or malformed conversation.
pub const INVALID_MESSAGES: &str = "Missing or invalid messages array";

/// A caller's question: the conversation plus optional model and timezone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub messages: Vec<Message>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub timezone: Option<String>,
}

impl AskRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

pub struct AskPipeline {
    config: Arc<AppConfig>,
    completion: Arc<dyn CompletionProvider>,
    search: Option<Arc<dyn SearchProvider>>,
    deep_search: Option<Arc<dyn SearchProvider>>,
    classifier: Arc<dyn FreshnessClassifier>,
}

impl AskPipeline {
    /// Create a pipeline with no search backends; the freshness classifier is
    /// built from the configured keywords.
    pub fn new(config: Arc<AppConfig>, completion: Arc<dyn CompletionProvider>) -> Result<Self> {
        let classifier = KeywordClassifier::new(&config.augment.fresh_keywords)
            .map_err(|e| Error::config(format!("invalid fresh_keywords: {e}")))?;
        Ok(Self {
            config,
            completion,
            search: None,
            deep_search: None,
            classifier: Arc::new(classifier),
        })
    }

    /// Search backend used for time-sensitive queries.
    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    /// Search backend used by the passthrough model and deep-search augmentation.
    pub fn with_deep_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.deep_search = Some(search);
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn FreshnessClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Answer a conversation, returning the reply text.
    pub async fn ask(&self, request: AskRequest) -> Result<String> {
        if request.messages.is_empty() {
            return Err(Error::Validation(INVALID_MESSAGES.into()));
        }

        let model = self.resolve_model(request.model.as_deref());
        let timezone = request
            .timezone
            .as_deref()
            .map(str::trim)
            .filter(|tz| !tz.is_empty())
            .unwrap_or(DEFAULT_TIMEZONE);

        let last_text = last_user_message(&request.messages)
            .map(|m| m.content.trim())
            .unwrap_or_default();

        info!(
            model = %model,
            timezone,
            messages = request.messages.len(),
            "Handling ask request"
        );

        if self.config.passthrough_model() == Some(model.as_str()) {
            return self.passthrough(&model, last_text).await;
        }

        self.config.completion_readiness()?;

        // Classification and augmenting searches use the lower-cased text.
        let query = last_text.to_lowercase();
        let digests = self.gather_digests(&query).await;
        let messages = assembler::assemble(&request.messages, timezone, digests);

        let completion = CompletionRequest {
            model: model.clone(),
            messages,
            temperature: self.config.completion.temperature,
            max_tokens: self.config.completion.max_tokens,
        };

        match self.completion.complete(completion).await {
            Ok(response) => {
                debug!(
                    provider = self.completion.name(),
                    model = %response.model,
                    chars = response.content.len(),
                    "Completion received"
                );
                Ok(response.content)
            }
            Err(e) => {
                error!(
                    provider = self.completion.name(),
                    model = %model,
                    status = ?e.status_code(),
                    "Completion failed: {e}"
                );
                Err(e.into())
            }
        }
    }

    fn resolve_model(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.config.completion.default_model.trim())
            .to_string()
    }

    /// Answer with deep-search hits alone.
    async fn passthrough(&self, model: &str, query: &str) -> Result<String> {
        let label = self
            .config
            .models
            .iter()
            .find(|m| m.value == model)
            .map_or(model, |m| m.label.as_str())
            .to_string();

        let search = self
            .deep_search
            .as_ref()
            .ok_or_else(|| Error::config(format!("{label} requires a deep search provider")))?;

        let options =
            SearchOptions::default().with_num_results(self.config.augment.passthrough_num_results);

        match search.search(query, options).await {
            Ok(results) => {
                debug!(count = results.len(), "Passthrough search complete");
                Ok(assembler::format_passthrough(&results))
            }
            Err(e) => {
                error!(provider = search.name(), "Passthrough search failed: {e}");
                Err(Error::Passthrough {
                    model: label,
                    source: e,
                })
            }
        }
    }

    /// Collect the optional digests. Search failures are logged and skipped.
    async fn gather_digests(&self, query: &str) -> Vec<Digest> {
        let mut digests = Vec::new();

        if self.classifier.is_fresh(query) {
            match &self.search {
                Some(search) => {
                    let options = SearchOptions::recent()
                        .with_num_results(self.config.augment.num_results);
                    if let Some(digest) =
                        run_search(search.as_ref(), query, options, FRESH_RESULTS_HEADING).await
                    {
                        digests.push(digest);
                    }
                }
                None => debug!("Query looks time-sensitive but no search provider is configured"),
            }
        }

        let augment = &self.config.augment;
        if augment.deep_search && freshness::exceeds_length(query, augment.deep_search_min_chars) {
            if let Some(search) = &self.deep_search {
                let options = SearchOptions::default().with_num_results(augment.num_results);
                if let Some(digest) =
                    run_search(search.as_ref(), query, options, DEEP_INSIGHTS_HEADING).await
                {
                    digests.push(digest);
                }
            }
        }

        digests
    }
}

async fn run_search(
    search: &dyn SearchProvider,
    query: &str,
    options: SearchOptions,
    heading: &str,
) -> Option<Digest> {
    match search.search(query, options).await {
        Ok(results) => {
            debug!(provider = search.name(), count = results.len(), "Search complete");
            Digest::from_results(heading, &results)
        }
        Err(e) => {
            warn!(provider = search.name(), "Search failed, continuing without results: {e}");
            None
        }
    }
}
