//! # askrelay Core
//!
//! Domain types, traits, and error definitions for the askrelay chat gateway.
//! This crate has **no HTTP dependencies**: it defines the domain model that
//! the provider, search and gateway crates implement against.
//!
//! ## Design Philosophy
//!
//! Every outbound collaborator (completion API, search API) is a trait here.
//! Vendor implementations live in their own crates. This enables:
//! - Choosing vendors via configuration at startup
//! - Substituting fakes in tests
//! - A clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod model;
pub mod provider;
pub mod search;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, SearchError};
pub use message::{Message, Role};
pub use model::ModelOption;
pub use provider::{CompletionProvider, CompletionRequest, CompletionResponse};
pub use search::{SearchOptions, SearchProvider, SearchResult};
