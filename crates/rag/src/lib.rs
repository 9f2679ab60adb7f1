//! Retrieval-augmented generation pipeline for medbot.
//!
//! This crate wires three externally hosted capabilities into one linear,
//! stateless pipeline: an embedding function, a pre-built vector index, and
//! a chat completion model. A question becomes an ordered evidence set,
//! the evidence set becomes a fixed two-role prompt, and the prompt becomes
//! an answer returned verbatim.
//!
//! Components are polymorphic trait objects so alternate implementations
//! (mocks, other providers) can be substituted via dependency injection:
//! - [`embeddings::EmbeddingProvider`] — question encoding
//! - [`index::VectorIndex`] — top-k similarity search
//! - [`retriever::Retriever`] — question to evidence set
//! - [`pipeline::PromptAssembler`] — evidence set to prompt
//! - [`pipeline::AnswerSynthesizer`] — prompt to answer
//! - [`pipeline::RagPipeline`] — the orchestrator, the only entry point

pub mod embeddings;
pub mod factory;
pub mod index;
pub mod pipeline;
pub mod retriever;
pub mod types;

// Re-export commonly used types
pub use factory::build_pipeline;
pub use pipeline::{AnswerSynthesizer, ChatSynthesizer, PromptAssembler, RagPipeline, TemplateAssembler};
pub use retriever::{IndexRetriever, Retriever};
pub use types::{EvidencePassage, EvidenceSet};
