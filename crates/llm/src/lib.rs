//! LLM integration crate for medbot.
//!
//! This crate provides a provider-agnostic abstraction for single-shot,
//! non-streaming chat completions. A completion carries at most two roles:
//! an optional system instruction and a user message.
//!
//! # Providers
//! - **Gemini**: Google's hosted generative API (default)
//! - **Ollama**: Local LLM runtime
//!
//! # Example
//! ```no_run
//! use medbot_llm::{ChatClient, ChatRequest, providers::OllamaChatClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaChatClient::new();
//! let request = ChatRequest::new("What is a fracture?", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{ChatClient, ChatRequest, ChatResponse, ChatUsage};
pub use factory::create_client;
pub use providers::{GeminiClient, OllamaChatClient};
