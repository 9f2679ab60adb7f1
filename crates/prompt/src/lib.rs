//! Prompt system for medbot.
//!
//! This crate owns the fixed system-instruction template and the pure
//! assembly step that substitutes retrieved evidence into it. The template
//! is immutable for the process lifetime; assembly is a deterministic
//! function of its inputs and performs no I/O.

pub mod builder;
pub mod types;

// Re-export main types
pub use builder::{assemble, EVIDENCE_SEPARATOR, SYSTEM_TEMPLATE};
pub use types::ChatPrompt;
