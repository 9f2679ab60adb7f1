//! Command handlers for the Medbot CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod chat;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
