//! Retriever: question to ordered evidence set.

use crate::embeddings::EmbeddingProvider;
use crate::index::VectorIndex;
use crate::types::EvidenceSet;
use medbot_core::AppResult;
use std::sync::Arc;

/// Trait for retrieval implementations.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// Map a question to at most top-k evidence passages, closest first.
    ///
    /// The question is forwarded unvalidated; empty input is the caller's
    /// concern. A failed embedding or index call propagates as
    /// `AppError::Retrieval` with no retry and no fallback to an empty set.
    async fn retrieve(&self, question: &str) -> AppResult<EvidenceSet>;
}

/// Retriever backed by an embedding provider and a vector index.
pub struct IndexRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl IndexRetriever {
    /// Create a retriever over the given embedder and index.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }

    /// The configured retrieval count.
    pub fn top_k(&self) -> usize {
        self.top_k
    }
}

#[async_trait::async_trait]
impl Retriever for IndexRetriever {
    async fn retrieve(&self, question: &str) -> AppResult<EvidenceSet> {
        tracing::debug!(
            "Retrieving top-{} passages via {} / {}",
            self.top_k,
            self.embedder.provider_name(),
            self.index.provider_name()
        );

        let query_vector = self.embedder.embed(question).await?;
        let mut passages = self.index.query(&query_vector, self.top_k).await?;

        // The k bound holds even against an over-returning backend
        passages.truncate(self.top_k);

        tracing::debug!("Retrieved {} passages", passages.len());
        Ok(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::mock::MockProvider;
    use crate::types::EvidencePassage;
    use medbot_core::AppError;

    fn passage(id: &str, text: &str, score: f32) -> EvidencePassage {
        EvidencePassage {
            id: id.to_string(),
            text: text.to_string(),
            score,
            metadata: serde_json::Value::Null,
        }
    }

    /// Index stub returning a fixed passage list regardless of the query.
    struct FixedIndex {
        passages: Vec<EvidencePassage>,
    }

    #[async_trait::async_trait]
    impl VectorIndex for FixedIndex {
        fn provider_name(&self) -> &str {
            "fixed"
        }

        async fn query(&self, _vector: &[f32], _top_k: usize) -> AppResult<EvidenceSet> {
            Ok(self.passages.clone())
        }
    }

    /// Index stub that always fails.
    struct BrokenIndex;

    #[async_trait::async_trait]
    impl VectorIndex for BrokenIndex {
        fn provider_name(&self) -> &str {
            "broken"
        }

        async fn query(&self, _vector: &[f32], _top_k: usize) -> AppResult<EvidenceSet> {
            Err(AppError::Retrieval("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_retrieve_preserves_index_order() {
        let index = FixedIndex {
            passages: vec![
                passage("a", "first", 0.9),
                passage("b", "second", 0.8),
                passage("c", "third", 0.7),
            ],
        };
        let retriever =
            IndexRetriever::new(Arc::new(MockProvider::new(384)), Arc::new(index), 10);

        let results = retriever.retrieve("question").await.unwrap();
        let ids: Vec<_> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_retrieve_never_exceeds_top_k() {
        // Backend misbehaves and returns more than requested
        let index = FixedIndex {
            passages: (0..7)
                .map(|i| passage(&format!("p{}", i), "text", 0.5))
                .collect(),
        };
        let retriever =
            IndexRetriever::new(Arc::new(MockProvider::new(384)), Arc::new(index), 3);

        let results = retriever.retrieve("question").await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].id, "p0");
    }

    #[tokio::test]
    async fn test_retrieve_forwards_empty_question() {
        let index = FixedIndex { passages: vec![] };
        let retriever =
            IndexRetriever::new(Arc::new(MockProvider::new(384)), Arc::new(index), 10);

        // No validation: empty input flows through to an empty result
        let results = retriever.retrieve("").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_index_failure_propagates() {
        let retriever =
            IndexRetriever::new(Arc::new(MockProvider::new(384)), Arc::new(BrokenIndex), 10);

        let result = retriever.retrieve("question").await;
        assert!(matches!(result, Err(AppError::Retrieval(_))));
    }
}
