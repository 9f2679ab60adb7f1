//! Pipeline orchestration: retrieve, assemble, synthesize.
//!
//! `RagPipeline::answer` is the only entry point the surrounding
//! application calls. Each invocation is independent: no conversation
//! history, no cache, no state carried between calls.

use crate::retriever::Retriever;
use crate::types::EvidencePassage;
use medbot_core::{AppError, AppResult};
use medbot_llm::{ChatClient, ChatRequest};
use medbot_prompt::{ChatPrompt, EVIDENCE_SEPARATOR};
use std::sync::Arc;

/// Trait for prompt assembly implementations.
///
/// Assembly is pure computation; implementations must not perform I/O and
/// must produce byte-identical output for identical inputs.
pub trait PromptAssembler: Send + Sync {
    /// Combine the question and the ordered evidence into a two-role prompt.
    fn assemble(&self, question: &str, evidence: &[EvidencePassage]) -> AppResult<ChatPrompt>;
}

/// Assembler using the fixed system template.
///
/// Passage texts are joined in rank order with the configured separator and
/// substituted into the template's single placeholder. No re-sorting, no
/// deduplication, no truncation. An empty evidence set yields an empty
/// substitution.
pub struct TemplateAssembler;

impl PromptAssembler for TemplateAssembler {
    fn assemble(&self, question: &str, evidence: &[EvidencePassage]) -> AppResult<ChatPrompt> {
        let evidence_text = evidence
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(EVIDENCE_SEPARATOR);

        medbot_prompt::assemble(question, &evidence_text)
    }
}

/// Trait for answer synthesis implementations.
#[async_trait::async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    /// Submit the prompt for completion and return the model's text verbatim.
    async fn synthesize(&self, prompt: &ChatPrompt) -> AppResult<String>;
}

/// Synthesizer backed by a chat completion client.
///
/// One non-streaming completion call per invocation, no retry. An empty
/// model response is a synthesis failure, not a silent empty answer.
pub struct ChatSynthesizer {
    client: Arc<dyn ChatClient>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl ChatSynthesizer {
    /// Create a synthesizer over the given client and model.
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the sampling temperature for every request.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap the number of generated tokens per request.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[async_trait::async_trait]
impl AnswerSynthesizer for ChatSynthesizer {
    async fn synthesize(&self, prompt: &ChatPrompt) -> AppResult<String> {
        tracing::debug!(
            "Synthesizing answer via {} ({})",
            self.client.provider_name(),
            self.model
        );

        let mut request =
            ChatRequest::new(prompt.user.clone(), &self.model).with_system(prompt.system.clone());

        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let response = self.client.complete(&request).await?;

        if response.content.is_empty() {
            return Err(AppError::Synthesis(
                "Model returned an empty response".to_string(),
            ));
        }

        Ok(response.content)
    }
}

/// The retrieval-augmented answer pipeline.
///
/// Holds the three component handles, constructed once at startup and
/// passed explicitly; nothing here reads ambient globals. The pipeline is
/// `Send + Sync`, so concurrent invocations are safe and share no mutable
/// state.
pub struct RagPipeline {
    retriever: Arc<dyn Retriever>,
    assembler: Arc<dyn PromptAssembler>,
    synthesizer: Arc<dyn AnswerSynthesizer>,
}

impl RagPipeline {
    /// Create a pipeline from its three components.
    pub fn new(
        retriever: Arc<dyn Retriever>,
        assembler: Arc<dyn PromptAssembler>,
        synthesizer: Arc<dyn AnswerSynthesizer>,
    ) -> Self {
        Self {
            retriever,
            assembler,
            synthesizer,
        }
    }

    /// Answer a question: retrieve, assemble, synthesize, strictly in order.
    ///
    /// Failures propagate unchanged; there is no fallback answer and no
    /// local recovery. A retrieval failure means the model is never called.
    /// The model's own "I don't know." is a normal answer, not an error.
    pub async fn answer(&self, question: &str) -> AppResult<String> {
        tracing::info!("Answering question ({} chars)", question.len());

        let evidence = self.retriever.retrieve(question).await?;
        tracing::debug!("Assembling prompt from {} passages", evidence.len());

        let prompt = self.assembler.assemble(question, &evidence)?;
        let answer = self.synthesizer.synthesize(&prompt).await?;

        tracing::info!("Answer synthesized ({} chars)", answer.len());
        Ok(answer)
    }
}
