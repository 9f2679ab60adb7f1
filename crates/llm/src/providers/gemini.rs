//! Gemini chat provider implementation.
//!
//! This module integrates with the Google Generative Language API.
//! API reference: https://ai.google.dev/api/generate-content

use crate::client::{ChatClient, ChatRequest, ChatResponse, ChatUsage};
use medbot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Gemini generateContent request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Gemini generateContent response format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// Gemini chat client.
pub struct GeminiClient {
    /// API base URL
    base_url: String,

    /// API key sent with every request
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client with the default endpoint and timeout.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_options(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a new Gemini client with a custom base URL and timeout.
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Convert ChatRequest to Gemini format.
    fn to_gemini_request(&self, request: &ChatRequest) -> GeminiRequest {
        let generation_config =
            if request.temperature.is_some() || request.max_tokens.is_some() {
                Some(GenerationConfig {
                    temperature: request.temperature,
                    max_output_tokens: request.max_tokens,
                })
            } else {
                None
            };

        GeminiRequest {
            system_instruction: request.system.as_ref().map(|text| GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: text.clone() }],
            }),
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.user.clone(),
                }],
            }],
            generation_config,
        }
    }
}

#[async_trait::async_trait]
impl ChatClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::info!("Sending completion request to Gemini");
        tracing::debug!("Model: {}", request.model);

        let gemini_request = self.to_gemini_request(request);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| AppError::Synthesis(format!("Failed to send request to Gemini: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Synthesis(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Synthesis(format!("Failed to parse Gemini response: {}", e)))?;

        let content = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| {
                AppError::Synthesis("Gemini response contained no candidates".to_string())
            })?;

        let usage = gemini_response
            .usage_metadata
            .map(|u| ChatUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        tracing::info!("Received completion from Gemini");

        Ok(ChatResponse {
            content,
            model: request.model.clone(),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_client_creation() {
        let client = GeminiClient::new("test-key").unwrap();
        assert_eq!(client.provider_name(), "gemini");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_gemini_request_conversion() {
        let client = GeminiClient::new("test-key").unwrap();
        let request = ChatRequest::new("What is a fracture?", "gemini-2.0-flash")
            .with_system("Answer from context only.")
            .with_temperature(0.3);

        let gemini_req = client.to_gemini_request(&request);
        assert_eq!(gemini_req.contents.len(), 1);
        assert_eq!(
            gemini_req.contents[0].parts[0].text,
            "What is a fracture?"
        );
        assert_eq!(
            gemini_req.system_instruction.as_ref().unwrap().parts[0].text,
            "Answer from context only."
        );
        assert_eq!(
            gemini_req.generation_config.as_ref().unwrap().temperature,
            Some(0.3)
        );
    }

    #[test]
    fn test_gemini_response_parsing() {
        let body = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "A fracture is a break in a bone."}]}}
            ],
            "usageMetadata": {"promptTokenCount": 42, "candidatesTokenCount": 9, "totalTokenCount": 51}
        }"#;

        let parsed: GeminiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.candidates.len(), 1);
        assert_eq!(parsed.usage_metadata.as_ref().unwrap().prompt_token_count, 42);
    }
}
