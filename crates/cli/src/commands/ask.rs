//! Ask command handler.
//!
//! Answers a single question through the retrieval pipeline and prints
//! the answer.

use clap::Args;
use medbot_core::{config::AppConfig, AppError, AppResult};
use medbot_rag::build_pipeline;
use std::path::PathBuf;

/// Ask a single question and print the answer
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = self.get_question()?;
        tracing::debug!("Question: {}", question);

        let pipeline = build_pipeline(config).await?;
        let answer = pipeline.answer(&question).await?;

        if self.json {
            let output = serde_json::json!({
                "question": question,
                "answer": answer,
                "provider": config.provider,
                "model": config.model,
                "topK": config.retrieval.top_k,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer);
        }

        Ok(())
    }

    fn get_question(&self) -> AppResult<String> {
        if let Some(ref question) = self.question {
            return Ok(question.clone());
        }

        if let Some(ref path) = self.file {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("Failed to read question file {:?}: {}", path, e))
            })?;
            return Ok(contents.trim().to_string());
        }

        Err(AppError::Config("No question provided".to_string()))
    }
}
