//! Provider router: builds the configured completion vendor.
//!
//! The vendor is chosen once at startup from `completion.provider`; requests
//! never branch on vendor names.

use std::sync::Arc;
use std::time::Duration;

use askrelay_config::AppConfig;
use askrelay_core::error::ProviderError;
use askrelay_core::provider::CompletionProvider;

use crate::openai_compat::OpenAiCompatProvider;

/// Build the completion provider described by `config`.
///
/// A missing API key is not an error here: readiness is checked per request
/// so the rest of the gateway keeps serving.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
    let completion = &config.completion;
    let name = completion.provider.trim().to_ascii_lowercase();

    let base_url = match &completion.api_url {
        Some(url) => url.clone(),
        None => default_base_url(&name)
            .map(String::from)
            .ok_or_else(|| {
                ProviderError::NotConfigured(format!(
                    "no built-in endpoint for provider '{name}'; set completion.api_url"
                ))
            })?,
    };

    let api_key = completion.api_key.clone().unwrap_or_default();
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let provider = OpenAiCompatProvider::new(name, base_url, api_key, timeout)?;
    Ok(Arc::new(provider))
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> Option<&'static str> {
    match provider_name {
        "groq" => Some("https://api.groq.com/openai/v1"),
        "together" => Some("https://api.together.xyz/v1"),
        "openai" => Some("https://api.openai.com/v1"),
        "openrouter" => Some("https://openrouter.ai/api/v1"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("groq").unwrap().contains("api.groq.com"));
        assert!(default_base_url("together").unwrap().contains("together.xyz"));
        assert!(default_base_url("acme").is_none());
    }

    #[test]
    fn build_from_default_config() {
        let config = AppConfig::default();
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "groq");
    }

    #[test]
    fn provider_name_is_case_insensitive() {
        let mut config = AppConfig::default();
        config.completion.provider = "Together".into();
        assert_eq!(build_from_config(&config).unwrap().name(), "together");
    }

    #[test]
    fn custom_provider_needs_url() {
        let mut config = AppConfig::default();
        config.completion.provider = "acme".into();
        assert!(matches!(
            build_from_config(&config),
            Err(ProviderError::NotConfigured(_))
        ));

        config.completion.api_url = Some("http://localhost:8000/v1".into());
        assert_eq!(build_from_config(&config).unwrap().name(), "acme");
    }
}
