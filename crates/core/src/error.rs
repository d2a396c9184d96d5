//! Error types for the askrelay domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context (completion, search) has its own error enum; the
//! top-level [`Error`] is what the request pipeline reports to callers.

use thiserror::Error;

/// The top-level error type for all askrelay operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Caller errors ---
    #[error("{0}")]
    Validation(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    // --- Deployment errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Upstream errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// A search-only model whose search failed; there is no reply to fall back on.
    #[error("{model} failed: {source}")]
    Passthrough { model: String, source: SearchError },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the caller (rather than the deployment or an upstream) must fix
    /// something for the request to succeed.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::MethodNotAllowed)
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider: {message}")]
    RateLimited { message: String },

    #[error("Authentication failed: {message} (status: {status_code})")]
    AuthenticationFailed { status_code: u16, message: String },

    #[error("Empty reply from {0}")]
    EmptyReply(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Upstream HTTP status, when the provider answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status_code, .. } | Self::AuthenticationFailed { status_code, .. } => {
                Some(*status_code)
            }
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Search provider not configured: {0}")]
    NotConfigured(String),

    #[error("Search API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Search request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid search response: {0}")]
    InvalidResponse(String),
}
