//! Embedding provider abstraction.
//!
//! The question embedding must come from the same model family that built
//! the index; that consistency is configured by the operator, not checked
//! here.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
