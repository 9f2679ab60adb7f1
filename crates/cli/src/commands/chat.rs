//! Chat command handler.
//!
//! Interactive question loop over the retrieval pipeline. The transcript
//! is display-only: every question goes through the pipeline on its own,
//! with no conversation history attached to the request.

use chrono::{DateTime, Utc};
use clap::Args;
use medbot_core::{config::AppConfig, AppError, AppResult};
use medbot_rag::build_pipeline;
use std::io::{BufRead, Write};

/// Interactive question loop
#[derive(Args, Debug)]
pub struct ChatCommand {}

/// One question/answer exchange in the session transcript.
#[derive(Debug, Clone)]
struct ConversationTurn {
    question: String,
    answer: String,
    timestamp: DateTime<Utc>,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let pipeline = build_pipeline(config).await?;
        let mut history: Vec<ConversationTurn> = Vec::new();

        println!(
            "Medbot chat ({}/{}). Type a question, /history, /clear, or /quit.",
            config.provider, config.model
        );

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        loop {
            print!("> ");
            stdout.flush().map_err(AppError::Io)?;

            let mut line = String::new();
            let read = stdin.lock().read_line(&mut line).map_err(AppError::Io)?;
            if read == 0 {
                // EOF
                break;
            }

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            match input {
                "/quit" | "/exit" => break,

                "/clear" => {
                    history.clear();
                    println!("History cleared.");
                }

                "/history" => {
                    if history.is_empty() {
                        println!("No history yet.");
                    }
                    for (i, turn) in history.iter().enumerate() {
                        println!(
                            "[{}] {} Q: {}",
                            i + 1,
                            turn.timestamp.format("%H:%M:%S"),
                            turn.question
                        );
                        println!("    A: {}", turn.answer);
                    }
                }

                question => {
                    match pipeline.answer(question).await {
                        Ok(answer) => {
                            println!("{}", answer);
                            history.push(ConversationTurn {
                                question: question.to_string(),
                                answer,
                                timestamp: Utc::now(),
                            });
                        }
                        Err(e) => {
                            // One failed question does not end the session
                            tracing::error!("Answer failed: {}", e);
                            eprintln!("Error: {}", e);
                        }
                    }
                }
            }
        }

        tracing::info!("Chat session ended ({} turns)", history.len());
        Ok(())
    }
}
