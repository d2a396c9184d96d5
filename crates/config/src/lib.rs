//! Configuration loading, validation, and management for askrelay.
//!
//! Loads configuration from `~/.askrelay/config.toml` (or an explicit path)
//! with environment variable overrides. The result is validated once at
//! startup and then shared read-only by every component.

use askrelay_core::ModelOption;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The root configuration structure.
///
/// Maps directly to `~/.askrelay/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Timeout applied to every outbound HTTP call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Chat-completion provider settings
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Web-search provider settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Prompt augmentation policy
    #[serde(default)]
    pub augment: AugmentConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Models offered to the front-end, in display order
    #[serde(default = "default_models")]
    pub models: Vec<ModelOption>,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_models() -> Vec<ModelOption> {
    vec![
        ModelOption::new("LLaMA 3 8B", "llama3-8b-8192"),
        ModelOption::new("LLaMA 3 70B", "llama3-70b-8192"),
        ModelOption::new("DeepSeek R1", "deepseek_r1"),
    ]
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("completion", &self.completion)
            .field("search", &self.search)
            .field("augment", &self.augment)
            .field("gateway", &self.gateway)
            .field("models", &self.models)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Vendor name: "groq", "together", or any OpenAI-compatible name with `api_url`
    #[serde(default = "default_completion_provider")]
    pub provider: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Overrides the vendor's built-in base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Model used when a request does not name one
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_completion_provider() -> String {
    "groq".into()
}
fn default_model() -> String {
    "llama3-8b-8192".into()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_completion_provider(),
            api_key: None,
            api_url: None,
            default_model: default_model(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("provider", &self.provider)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Which vendor answers freshness searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    Bing,
    Google,
    DeepSeek,
    /// Never search; fresh queries go to the model unaugmented
    None,
}

impl FromStr for SearchBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bing" => Ok(Self::Bing),
            "google" => Ok(Self::Google),
            "deepseek" => Ok(Self::DeepSeek),
            "none" | "off" => Ok(Self::None),
            other => Err(ConfigError::ValidationError(format!(
                "unknown search provider '{other}' (expected bing, google, deepseek or none)"
            ))),
        }
    }
}

impl std::fmt::Display for SearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Bing => "bing",
            Self::Google => "google",
            Self::DeepSeek => "deepseek",
            Self::None => "none",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_backend")]
    pub provider: SearchBackend,

    #[serde(default)]
    pub bing: BingConfig,

    #[serde(default)]
    pub google: GoogleConfig,

    #[serde(default)]
    pub deepseek: DeepSeekConfig,
}

fn default_search_backend() -> SearchBackend {
    SearchBackend::Google
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_search_backend(),
            bing: BingConfig::default(),
            google: GoogleConfig::default(),
            deepseek: DeepSeekConfig::default(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct BingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_bing_endpoint")]
    pub endpoint: String,
}

fn default_bing_endpoint() -> String {
    "https://api.bing.microsoft.com/v7.0/search".into()
}

impl Default for BingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_bing_endpoint(),
        }
    }
}

impl std::fmt::Debug for BingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BingConfig")
            .field("api_key", &redact(&self.api_key))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Programmable Search Engine id (`cx`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cse_id: Option<String>,

    #[serde(default = "default_google_endpoint")]
    pub endpoint: String,
}

fn default_google_endpoint() -> String {
    "https://www.googleapis.com/customsearch/v1".into()
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            cse_id: None,
            endpoint: default_google_endpoint(),
        }
    }
}

impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("api_key", &redact(&self.api_key))
            .field("cse_id", &self.cse_id)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DeepSeekConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_deepseek_url")]
    pub api_url: String,
}

fn default_deepseek_url() -> String {
    "https://api.deepseek.com/v1".into()
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_deepseek_url(),
        }
    }
}

impl std::fmt::Debug for DeepSeekConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AugmentConfig {
    /// Whole-word keywords that mark a query as time-sensitive
    #[serde(default = "default_fresh_keywords")]
    pub fresh_keywords: Vec<String>,

    /// Results requested for a freshness search
    #[serde(default = "default_num_results")]
    pub num_results: usize,

    /// Add a DeepSeek digest to long queries
    #[serde(default)]
    pub deep_search: bool,

    /// Queries longer than this many characters trigger the deep search
    #[serde(default = "default_deep_search_min_chars")]
    pub deep_search_min_chars: usize,

    /// Model id answered directly by DeepSeek search hits (empty = disabled)
    #[serde(default = "default_passthrough_model")]
    pub passthrough_model: String,

    /// Results requested in passthrough mode
    #[serde(default = "default_passthrough_num_results")]
    pub passthrough_num_results: usize,
}

pub fn default_fresh_keywords() -> Vec<String> {
    ["today", "latest", "breaking", "news", "this week", "this month"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_num_results() -> usize {
    5
}
fn default_deep_search_min_chars() -> usize {
    50
}
fn default_passthrough_model() -> String {
    "deepseek_r1".into()
}
fn default_passthrough_num_results() -> usize {
    10
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            fresh_keywords: default_fresh_keywords(),
            num_results: default_num_results(),
            deep_search: false,
            deep_search_min_chars: default_deep_search_min_chars(),
            passthrough_model: default_passthrough_model(),
            passthrough_num_results: default_passthrough_num_results(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Origins allowed by CORS (empty = same-origin only)
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Maximum accepted request body, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: vec![],
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.askrelay/config.toml)
    /// and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_path(&Self::config_dir().join("config.toml"))
    }

    /// Load configuration from `path` and apply environment overrides.
    ///
    /// Recognised variables (highest priority):
    /// - `ASKRELAY_API_KEY`, `GROQ_API_KEY`
    /// - `ASKRELAY_MODEL`, `GROQ_DEFAULT_MODEL`
    /// - `ASKRELAY_PROVIDER`, `ASKRELAY_SEARCH_PROVIDER`
    /// - `BING_SEARCH_KEY`, `BING_SEARCH_ENDPOINT`
    /// - `GOOGLE_API_KEY`, `GOOGLE_CSE_ID`
    /// - `DEEPSEEK_API_KEY`
    pub fn load_with_path(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path (no environment overrides).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.normalize_credentials();
        config.validate()?;
        Ok(config)
    }

    /// Trim every credential; a blank one counts as unset.
    fn normalize_credentials(&mut self) {
        let search = &mut self.search;
        for secret in [
            &mut self.completion.api_key,
            &mut search.bing.api_key,
            &mut search.google.api_key,
            &mut search.google.cse_id,
            &mut search.deepseek.api_key,
        ] {
            *secret = secret
                .take()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
        }
    }

    /// Apply overrides from an environment lookup. Blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |names: &[&str]| {
            names.iter().find_map(|name| {
                lookup(name)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            })
        };

        if let Some(key) = var(&["ASKRELAY_API_KEY", "GROQ_API_KEY"]) {
            self.completion.api_key = Some(key);
        }
        if let Some(model) = var(&["ASKRELAY_MODEL", "GROQ_DEFAULT_MODEL"]) {
            self.completion.default_model = model;
        }
        if let Some(provider) = var(&["ASKRELAY_PROVIDER"]) {
            self.completion.provider = provider;
        }
        if let Some(backend) = var(&["ASKRELAY_SEARCH_PROVIDER"]) {
            self.search.provider = backend.parse()?;
        }
        if let Some(key) = var(&["BING_SEARCH_KEY"]) {
            self.search.bing.api_key = Some(key);
        }
        if let Some(endpoint) = var(&["BING_SEARCH_ENDPOINT"]) {
            self.search.bing.endpoint = endpoint;
        }
        if let Some(key) = var(&["GOOGLE_API_KEY"]) {
            self.search.google.api_key = Some(key);
        }
        if let Some(cx) = var(&["GOOGLE_CSE_ID"]) {
            self.search.google.cse_id = Some(cx);
        }
        if let Some(key) = var(&["DEEPSEEK_API_KEY"]) {
            self.search.deepseek.api_key = Some(key);
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".askrelay")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(t) = self.completion.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(
                    "completion.temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        if self.augment.num_results == 0 || self.augment.passthrough_num_results == 0 {
            return Err(ConfigError::ValidationError(
                "augment result counts must be > 0".into(),
            ));
        }

        if self.models.is_empty() {
            return Err(ConfigError::ValidationError(
                "models catalog must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Check that everything a completion call needs is present.
    ///
    /// Evaluated per request so a misconfigured deployment still serves
    /// `/models` and `/health` and answers `/ask` with a clear error.
    pub fn completion_readiness(&self) -> Result<(), ConfigError> {
        if self.completion.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            return Err(ConfigError::MissingCredential(
                "completion API key (set GROQ_API_KEY or completion.api_key)".into(),
            ));
        }
        if self.completion.default_model.trim().is_empty() {
            return Err(ConfigError::MissingDefaultModel);
        }
        Ok(())
    }

    /// The passthrough model id, if enabled.
    pub fn passthrough_model(&self) -> Option<&str> {
        let model = self.augment.passthrough_model.trim();
        (!model.is_empty()).then_some(model)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            completion: CompletionConfig::default(),
            search: SearchConfig::default(),
            augment: AugmentConfig::default(),
            gateway: GatewayConfig::default(),
            models: default_models(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing {0}")]
    MissingCredential(String),

    #[error("Missing default model (set GROQ_DEFAULT_MODEL or completion.default_model)")]
    MissingDefaultModel,
}

impl From<ConfigError> for askrelay_core::Error {
    fn from(err: ConfigError) -> Self {
        askrelay_core::Error::config(err.to_string())
    }
}
