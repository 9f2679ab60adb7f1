//! Prompt types for medbot.

use serde::{Deserialize, Serialize};

/// A fully assembled two-role prompt ready for completion.
///
/// Exactly two parts: the system instruction with evidence substituted,
/// and the verbatim user question. Nothing is reordered or truncated
/// between assembly and submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPrompt {
    /// System instruction with the evidence text in place
    pub system: String,

    /// The user's question, unmodified
    pub user: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_serialization() {
        let prompt = ChatPrompt {
            system: "instruction".to_string(),
            user: "question".to_string(),
        };

        let json = serde_json::to_string(&prompt).unwrap();
        let deserialized: ChatPrompt = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, prompt);
    }
}
