//! Chat provider factory.
//!
//! This module provides a factory for creating chat clients based on
//! application configuration. It handles provider resolution and secret
//! injection.

use crate::client::ChatClient;
use crate::providers::{GeminiClient, OllamaChatClient};
use medbot_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a chat client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (required for Gemini)
/// * `timeout_secs` - Optional per-request timeout override
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or required
/// secrets are missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout_secs: Option<u64>,
) -> AppResult<Arc<dyn ChatClient>> {
    match provider.to_lowercase().as_str() {
        "gemini" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Gemini provider requires an API key".to_string())
            })?;

            let client = match (endpoint, timeout_secs) {
                (None, None) => GeminiClient::new(api_key)?,
                (base_url, timeout) => GeminiClient::with_options(
                    api_key,
                    base_url.unwrap_or("https://generativelanguage.googleapis.com"),
                    timeout.unwrap_or(60),
                )?,
            };
            Ok(Arc::new(client))
        }
        "ollama" => {
            let client = match (endpoint, timeout_secs) {
                (None, None) => OllamaChatClient::new(),
                (base_url, timeout) => OllamaChatClient::with_options(
                    base_url.unwrap_or("http://localhost:11434"),
                    timeout.unwrap_or(120),
                )?,
            };
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown chat provider: {}. Supported: gemini, ollama",
            provider
        ))),
    }
}
