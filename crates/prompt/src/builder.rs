//! Prompt assembly: evidence substitution into the fixed system template.

use crate::types::ChatPrompt;
use medbot_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// The fixed system-instruction template.
///
/// Has exactly one substitution point (`{{context}}`) for the concatenated
/// evidence text. The refusal rule lives here; the rest of the system never
/// second-guesses the model's judgment.
pub const SYSTEM_TEMPLATE: &str = "You are a knowledgeable assistant tasked with answering questions based on the full provided context. Analyze all the information before generating a response. Do not rely on individual sentences in isolation—synthesize information across the entire context. If the answer cannot be determined from the context, respond with 'I don't know.' Your answer should be clear, accurate.\n\n{{context}}";

/// Separator placed between consecutive evidence passages.
pub const EVIDENCE_SEPARATOR: &str = "\n\n";

/// Assemble a two-role prompt from a question and pre-joined evidence text.
///
/// Pure computation: the same inputs always produce byte-identical output.
/// Empty evidence text is valid and yields an empty substitution, not an
/// error. The question is carried verbatim as the user part.
pub fn assemble(question: &str, evidence_text: &str) -> AppResult<ChatPrompt> {
    tracing::debug!(
        "Assembling prompt ({} bytes of evidence)",
        evidence_text.len()
    );

    let mut variables = HashMap::new();
    variables.insert("context".to_string(), evidence_text.to_string());

    let system = render_template(SYSTEM_TEMPLATE, &variables)?;

    Ok(ChatPrompt {
        system,
        user: question.to_string(),
    })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Evidence is plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("system", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("system", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_substitutes_evidence() {
        let prompt = assemble("What is a fracture?", "A fracture is a break in a bone.").unwrap();

        assert!(prompt
            .system
            .ends_with("clear, accurate.\n\nA fracture is a break in a bone."));
        assert!(prompt
            .system
            .starts_with("You are a knowledgeable assistant"));
        assert_eq!(prompt.user, "What is a fracture?");
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let a = assemble("question", "evidence one\n\nevidence two").unwrap();
        let b = assemble("question", "evidence one\n\nevidence two").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_assemble_empty_evidence() {
        let prompt = assemble("What is the capital of France?", "").unwrap();

        // Empty substitution, not an error
        assert!(prompt.system.ends_with("clear, accurate.\n\n"));
        assert_eq!(prompt.user, "What is the capital of France?");
    }

    #[test]
    fn test_assemble_question_verbatim() {
        let question = "  weird   spacing?! ";
        let prompt = assemble(question, "evidence").unwrap();
        assert_eq!(prompt.user, question);
    }

    #[test]
    fn test_evidence_is_not_treated_as_template() {
        // Passage text containing template syntax must pass through literally
        let prompt = assemble("q", "see {{context}} for details").unwrap();
        assert!(prompt.system.contains("see {{context}} for details"));
    }

    #[test]
    fn test_no_html_escaping() {
        let prompt = assemble("q", "dose < 5mg & > 1mg").unwrap();
        assert!(prompt.system.contains("dose < 5mg & > 1mg"));
    }

    #[test]
    fn test_template_has_single_placeholder() {
        assert_eq!(SYSTEM_TEMPLATE.matches("{{context}}").count(), 1);
    }
}
