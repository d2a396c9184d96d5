//! The ask pipeline for askrelay.
//!
//! Turns a caller's conversation into one completion call:
//!
//! ```text
//! validate -> classify -> (search)? -> assemble -> dispatch -> reply
//! ```
//!
//! - [`freshness`]: swappable policies deciding when to search
//! - [`assembler`]: date / markdown / digest system messages
//! - [`pipeline`]: the orchestration itself

pub mod assembler;
pub mod freshness;
pub mod pipeline;

pub use assembler::{Digest, assemble, build_digest};
pub use freshness::{FreshnessClassifier, KeywordClassifier, is_fresh};
pub use pipeline::{AskPipeline, AskRequest};
