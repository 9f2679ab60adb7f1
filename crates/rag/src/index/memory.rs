//! In-memory vector index backend.
//!
//! Holds passages and their embeddings in process memory and answers top-k
//! queries by cosine similarity. Intended for tests and small local corpora;
//! the hosted index is the production path.

use crate::embeddings::EmbeddingProvider;
use crate::index::VectorIndex;
use crate::types::{EvidencePassage, EvidenceSet};
use medbot_core::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;

/// In-memory cosine-similarity index.
pub struct MemoryIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: Vec<Entry>,
}

struct Entry {
    id: String,
    text: String,
    embedding: Vec<f32>,
    metadata: serde_json::Value,
}

impl MemoryIndex {
    /// Create an empty index backed by the given embedding provider.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
        }
    }

    /// Add a passage to the index, embedding it with the index's provider.
    pub async fn add(&mut self, text: &str, metadata: serde_json::Value) -> AppResult<()> {
        let embedding = self.embedder.embed(text).await?;
        let id = format!("mem-{}", self.entries.len());

        self.entries.push(Entry {
            id,
            text: text.to_string(),
            embedding,
            metadata,
        });

        Ok(())
    }

    /// Load every `.txt` file under a directory as one passage each.
    pub async fn load_dir(&mut self, dir: &Path) -> AppResult<()> {
        if !dir.exists() {
            return Err(AppError::Config(format!(
                "Corpus directory does not exist: {:?}",
                dir
            )));
        }

        let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_type().is_file()
                    && e.path().extension().map_or(false, |ext| ext == "txt")
            })
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        for path in paths {
            let text = std::fs::read_to_string(&path)?;
            let metadata = serde_json::json!({
                "source": path.display().to_string(),
            });
            self.add(&text, metadata).await?;
        }

        tracing::info!("Loaded {} passages into memory index", self.entries.len());
        Ok(())
    }

    /// Number of passages in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no passages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            dot / (norm_a * norm_b)
        }
    }
}

#[async_trait::async_trait]
impl VectorIndex for MemoryIndex {
    fn provider_name(&self) -> &str {
        "memory"
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> AppResult<EvidenceSet> {
        let mut scored: Vec<(f32, &Entry)> = self
            .entries
            .iter()
            .map(|entry| (Self::cosine_similarity(&entry.embedding, vector), entry))
            .collect();

        // Stable sort keeps insertion order for tied scores
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, entry)| EvidencePassage {
                id: entry.id.clone(),
                text: entry.text.clone(),
                score,
                metadata: entry.metadata.clone(),
            })
            .collect())
    }
}
