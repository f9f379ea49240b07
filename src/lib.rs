//! Financial Support Assistant
//!
//! A line-based conversational assistant for a financial services company:
//! - Forwards each user message to a hosted Gemini chat session
//! - Keeps the full conversation as context for later turns
//! - Extracts personal/financial details from every message into an in-memory profile
//! - Shuts down cleanly on `exit`, end of input or Ctrl+C
//!
//! TURN LOOP:
//! INPUT → CHAT REPLY → EXTRACT DETAILS → MERGE PROFILE → PROMPT

pub mod config;
pub mod conversational;
pub mod error;
pub mod extractor;
pub mod gateway;
pub mod gemini;
pub mod memory;
pub mod profile;
pub mod repl;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AssistantError, Result};

// Re-export common types
pub use config::Config;
pub use extractor::ExtractedDetails;
pub use profile::{ProfileField, ProfileStore};
pub use repl::{Assistant, ExitReason};
