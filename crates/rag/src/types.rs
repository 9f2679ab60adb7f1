//! Evidence types shared across the retrieval pipeline.

use serde::{Deserialize, Serialize};

/// A single retrieved evidence passage.
///
/// The passage is opaque to the pipeline: its text is concatenated into the
/// prompt unmodified, and its metadata is carried through for provenance
/// display only. Nothing in the core reads or rewrites either field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidencePassage {
    /// Identifier assigned by the index
    pub id: String,

    /// Passage text as stored in the index
    pub text: String,

    /// Similarity score reported by the index
    pub score: f32,

    /// Opaque provenance metadata (source locator, page, etc.)
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// An ordered evidence set, closest passage first.
///
/// Order is the index's rank order and is preserved through assembly;
/// the pipeline never re-sorts or deduplicates it. Length is bounded by
/// the configured top-k.
pub type EvidenceSet = Vec<EvidencePassage>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passage_serialization() {
        let passage = EvidencePassage {
            id: "rec-1".to_string(),
            text: "A fracture is a break in a bone.".to_string(),
            score: 0.87,
            metadata: serde_json::json!({"source": "gale-encyclopedia.pdf", "page": 212}),
        };

        let json = serde_json::to_string(&passage).unwrap();
        let back: EvidencePassage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "rec-1");
        assert_eq!(back.metadata["page"], 212);
    }

    #[test]
    fn test_metadata_defaults_to_null() {
        let passage: EvidencePassage =
            serde_json::from_str(r#"{"id":"a","text":"t","score":0.5}"#).unwrap();
        assert!(passage.metadata.is_null());
    }
}
