//! Pipeline factory.
//!
//! Builds a ready-to-use [`RagPipeline`] from validated application
//! configuration. All provider resolution and secret injection happens
//! here, once, at startup; the pipeline itself never touches config or
//! environment.

use crate::embeddings::create_provider;
use crate::index::create_index;
use crate::pipeline::{ChatSynthesizer, RagPipeline, TemplateAssembler};
use crate::retriever::IndexRetriever;
use medbot_core::{AppConfig, AppResult};
use std::sync::Arc;

/// Build the answer pipeline from application configuration.
///
/// Expects a config that already passed [`AppConfig::validate`]; missing
/// credentials surface as `AppError::Config` from the individual factories.
pub async fn build_pipeline(config: &AppConfig) -> AppResult<RagPipeline> {
    tracing::debug!(
        "Building pipeline: llm={}/{}, embedding={}/{}, index={}, topK={}",
        config.provider,
        config.model,
        config.retrieval.embedding.provider,
        config.retrieval.embedding.model,
        config.retrieval.index.provider,
        config.retrieval.top_k
    );

    let embedder = create_provider(&config.retrieval.embedding)?;
    let index = create_index(&config.retrieval.index, embedder.clone()).await?;

    let provider_config = config.get_provider_config(&config.provider);
    let api_key = config.resolve_api_key(&config.provider);
    let client = medbot_llm::create_client(
        &config.provider,
        provider_config.as_ref().and_then(|p| p.endpoint()),
        api_key.as_deref(),
        provider_config.as_ref().and_then(|p| p.timeout()),
    )?;

    let retriever = IndexRetriever::new(embedder, index, config.retrieval.top_k);
    let synthesizer = ChatSynthesizer::new(client, &config.model);

    Ok(RagPipeline::new(
        Arc::new(retriever),
        Arc::new(TemplateAssembler),
        Arc::new(synthesizer),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use medbot_core::AppError;

    fn local_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        config.model = "llama3.2".to_string();
        config.retrieval.embedding.provider = "mock".to_string();
        config.retrieval.index.provider = "memory".to_string();
        config.retrieval.index.host_env = None;
        config.retrieval.index.api_key_env = None;
        config
    }

    #[tokio::test]
    async fn test_build_with_local_stack() {
        let config = local_config();
        assert!(build_pipeline(&config).await.is_ok());
    }

    #[tokio::test]
    async fn test_build_rejects_unknown_embedding_provider() {
        let mut config = local_config();
        config.retrieval.embedding.provider = "unknown".to_string();

        match build_pipeline(&config).await {
            Err(AppError::Config(msg)) => assert!(msg.contains("embedding provider")),
            other => panic!("Expected Config error, got {:?}", other.map(|_| ())),
        }
    }
}
