//! Pinecone vector index backend.
//!
//! Queries a hosted, pre-populated Pinecone index over its REST API.
//! Passage text is stored in the `text` metadata field, the layout used by
//! the ingestion tooling that built the reference medical index.

use crate::index::VectorIndex;
use crate::types::{EvidencePassage, EvidenceSet};
use medbot_core::config::IndexConfig;
use medbot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Metadata field holding the passage text.
const TEXT_FIELD: &str = "text";

/// Pinecone query request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

/// Pinecone query response format.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: serde_json::Value,
}

/// Pinecone index client.
pub struct PineconeIndex {
    /// HTTP client for API requests
    client: reqwest::Client,
    /// Index host URL (per-index, from the Pinecone console)
    host: String,
    /// API key sent with every request
    api_key: String,
    /// Optional namespace within the index
    namespace: Option<String>,
    /// Index name, for logging only
    name: String,
}

impl PineconeIndex {
    /// Create a new Pinecone client from configuration.
    ///
    /// Host and API key are read from the environment variables named in
    /// the config; a missing value is a configuration error and fatal at
    /// startup.
    pub fn new(config: &IndexConfig) -> AppResult<Self> {
        let host_env = config.host_env.as_deref().ok_or_else(|| {
            AppError::Config("Pinecone index requires hostEnv configuration".to_string())
        })?;
        let host = std::env::var(host_env).map_err(|_| {
            AppError::Config(format!(
                "Pinecone index host not found in environment variable: {}",
                host_env
            ))
        })?;

        let api_key_env = config.api_key_env.as_deref().ok_or_else(|| {
            AppError::Config("Pinecone index requires apiKeyEnv configuration".to_string())
        })?;
        let api_key = std::env::var(api_key_env).map_err(|_| {
            AppError::Config(format!(
                "Pinecone API key not found in environment variable: {}",
                api_key_env
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            host,
            api_key,
            namespace: config.namespace.clone(),
            name: config.name.clone(),
        })
    }

    fn match_to_passage(m: QueryMatch) -> AppResult<EvidencePassage> {
        let text = m
            .metadata
            .get(TEXT_FIELD)
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AppError::Retrieval(format!(
                    "Index record '{}' has no '{}' metadata field",
                    m.id, TEXT_FIELD
                ))
            })?
            .to_string();

        Ok(EvidencePassage {
            id: m.id,
            text,
            score: m.score,
            metadata: m.metadata,
        })
    }
}

#[async_trait::async_trait]
impl VectorIndex for PineconeIndex {
    fn provider_name(&self) -> &str {
        "pinecone"
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> AppResult<EvidenceSet> {
        let url = format!("{}/query", self.host);

        tracing::debug!("Querying Pinecone index '{}' (top_k={})", self.name, top_k);

        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            namespace: self.namespace.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::Retrieval(format!("Failed to send query to Pinecone: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Retrieval(format!(
                "Pinecone API error ({}): {}",
                status, error_text
            )));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to parse Pinecone response: {}", e)))?;

        // Matches arrive in rank order; keep it
        body.matches
            .into_iter()
            .map(Self::match_to_passage)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_host_env_is_config_error() {
        let config = IndexConfig {
            provider: "pinecone".to_string(),
            name: "medicalbot".to_string(),
            host_env: Some("MEDBOT_TEST_MISSING_PINECONE_HOST".to_string()),
            api_key_env: Some("MEDBOT_TEST_MISSING_PINECONE_KEY".to_string()),
            namespace: None,
            corpus_dir: None,
        };

        assert!(matches!(
            PineconeIndex::new(&config),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_match_to_passage() {
        let m: QueryMatch = serde_json::from_value(serde_json::json!({
            "id": "rec-7",
            "score": 0.91,
            "metadata": {"text": "A fracture is a break in a bone.", "source": "gale.pdf"}
        }))
        .unwrap();

        let passage = PineconeIndex::match_to_passage(m).unwrap();
        assert_eq!(passage.id, "rec-7");
        assert_eq!(passage.text, "A fracture is a break in a bone.");
        assert_eq!(passage.metadata["source"], "gale.pdf");
    }

    #[test]
    fn test_match_without_text_is_retrieval_error() {
        let m: QueryMatch = serde_json::from_value(serde_json::json!({
            "id": "rec-8",
            "score": 0.5,
            "metadata": {"source": "gale.pdf"}
        }))
        .unwrap();

        assert!(matches!(
            PineconeIndex::match_to_passage(m),
            Err(AppError::Retrieval(_))
        ));
    }

    #[test]
    fn test_query_response_parsing() {
        let body = r#"{"matches": [
            {"id": "a", "score": 0.9, "metadata": {"text": "first"}},
            {"id": "b", "score": 0.8, "metadata": {"text": "second"}}
        ], "namespace": ""}"#;

        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.matches.len(), 2);
        assert_eq!(parsed.matches[0].id, "a");
    }
}
