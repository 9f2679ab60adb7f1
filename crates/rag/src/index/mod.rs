//! Vector index abstraction.
//!
//! The index is pre-built and externally maintained; the pipeline only runs
//! read-only top-k similarity queries against it. Index construction and
//! corpus ingestion live outside this system.

pub mod memory;
pub mod pinecone;

use crate::embeddings::EmbeddingProvider;
use crate::types::EvidenceSet;
use medbot_core::config::IndexConfig;
use medbot_core::{AppError, AppResult};
use std::sync::Arc;

pub use memory::MemoryIndex;
pub use pinecone::PineconeIndex;

/// Trait for vector index backends.
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Get provider name (e.g., "pinecone", "memory")
    fn provider_name(&self) -> &str;

    /// Return the top-k passages closest to the query vector, closest first.
    ///
    /// The returned order is the backend's rank order; callers must treat
    /// it as authoritative. Ties keep the backend's native order.
    async fn query(&self, vector: &[f32], top_k: usize) -> AppResult<EvidenceSet>;
}

/// Create a vector index based on configuration.
///
/// The in-memory backend embeds its corpus at startup and therefore needs
/// the embedding provider; hosted backends ignore it.
pub async fn create_index(
    config: &IndexConfig,
    embedder: Arc<dyn EmbeddingProvider>,
) -> AppResult<Arc<dyn VectorIndex>> {
    match config.provider.as_str() {
        "pinecone" => {
            let index = PineconeIndex::new(config)?;
            Ok(Arc::new(index))
        }

        "memory" => {
            let mut index = MemoryIndex::new(embedder);
            if let Some(ref dir) = config.corpus_dir {
                index.load_dir(dir).await?;
            }
            Ok(Arc::new(index))
        }

        _ => Err(AppError::Config(format!(
            "Unknown index provider: '{}'. Supported providers: pinecone, memory",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::mock::MockProvider;

    #[tokio::test]
    async fn test_create_memory_index() {
        let config = IndexConfig {
            provider: "memory".to_string(),
            name: "medicalbot".to_string(),
            host_env: None,
            api_key_env: None,
            namespace: None,
            corpus_dir: None,
        };

        let embedder = Arc::new(MockProvider::new(384));
        let index = create_index(&config, embedder).await.unwrap();
        assert_eq!(index.provider_name(), "memory");
    }

    #[tokio::test]
    async fn test_create_unknown_index() {
        let config = IndexConfig {
            provider: "unknown".to_string(),
            name: "medicalbot".to_string(),
            host_env: None,
            api_key_env: None,
            namespace: None,
            corpus_dir: None,
        };

        let embedder = Arc::new(MockProvider::new(384));
        let result = create_index(&config, embedder).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
