//! Chat-completion provider implementations for askrelay.
//!
//! All providers implement the `askrelay_core::CompletionProvider` trait.
//! The router builds the configured vendor once at startup.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
