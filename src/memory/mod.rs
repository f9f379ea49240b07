//! Conversation Memory
//!
//! Append-only transcript of the user/model exchange for the process lifetime

pub mod store;

pub use store::{ConversationHistory, Turn, TurnRole};
