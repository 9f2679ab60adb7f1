//! Error types for the medbot CLI.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, retrieval, synthesis, prompt, I/O and
//! serialization errors.

use thiserror::Error;

/// Unified error type for the medbot CLI.
///
/// All functions in the application return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
///
/// Component failures keep their identity all the way up to the caller:
/// a failed index or embedding call is always `Retrieval`, a failed model
/// call is always `Synthesis`, and missing credentials at startup are
/// `Config` and fatal before any request is served.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing credentials, bad config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The embedding or index query could not complete
    #[error("Retrieval failure: {0}")]
    Retrieval(String),

    /// The language-model call could not complete or returned an
    /// empty/malformed response
    #[error("Synthesis failure: {0}")]
    Synthesis(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
