//! HuggingFace Inference API embedding provider.
//!
//! Calls the hosted feature-extraction pipeline for sentence-transformers
//! models. The default model (all-MiniLM-L6-v2, 384 dimensions) matches the
//! model used to build the reference medical index.

use crate::embeddings::provider::EmbeddingProvider;
use medbot_core::config::EmbeddingConfig;
use medbot_core::{AppError, AppResult};
use serde::Serialize;
use std::time::Duration;

/// Default Inference API base URL.
const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Request payload for the feature-extraction pipeline.
#[derive(Debug, Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: Vec<&'a str>,
    options: FeatureExtractionOptions,
}

#[derive(Debug, Serialize)]
struct FeatureExtractionOptions {
    wait_for_model: bool,
}

/// HuggingFace Inference API embedding provider.
#[derive(Debug, Clone)]
pub struct HuggingFaceProvider {
    /// HTTP client for API requests
    client: reqwest::Client,
    /// Inference API base URL
    base_url: String,
    /// Bearer token for the Inference API
    api_token: String,
    /// Model identifier (e.g., "sentence-transformers/all-MiniLM-L6-v2")
    model: String,
    /// Expected embedding dimensions
    dimensions: usize,
}

impl HuggingFaceProvider {
    /// Create a new provider from configuration.
    ///
    /// The API token is read from the environment variable named in
    /// `config.api_key_env`. A missing token is a configuration error and
    /// fatal at startup.
    pub fn new(config: &EmbeddingConfig) -> AppResult<Self> {
        let env_var = config.api_key_env.as_deref().unwrap_or("HF_API_TOKEN");
        let api_token = std::env::var(env_var).map_err(|_| {
            AppError::Config(format!(
                "HuggingFace API token not found in environment variable: {}",
                env_var
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_token,
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HuggingFaceProvider {
    fn provider_name(&self) -> &str {
        "huggingface"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!(
            "{}/pipeline/feature-extraction/{}",
            self.base_url, self.model
        );

        tracing::debug!("Sending embedding request to {}", url);

        let request = FeatureExtractionRequest {
            inputs: vec![text],
            options: FeatureExtractionOptions {
                wait_for_model: true,
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::Retrieval(format!("Failed to send request to HuggingFace: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Retrieval(format!(
                "HuggingFace API error ({}): {}",
                status, error_text
            )));
        }

        // The pipeline returns one vector per input
        let mut vectors: Vec<Vec<f32>> = response.json().await.map_err(|e| {
            AppError::Retrieval(format!("Failed to parse HuggingFace response: {}", e))
        })?;

        let embedding = vectors.pop().ok_or_else(|| {
            AppError::Retrieval("HuggingFace returned no embedding".to_string())
        })?;

        if embedding.len() != self.dimensions {
            return Err(AppError::Retrieval(format!(
                "Unexpected embedding dimensions: got {}, expected {}",
                embedding.len(),
                self.dimensions
            )));
        }

        Ok(embedding)
    }
}
