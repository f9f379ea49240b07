//! Conversation history storage
//!
//! Stores conversation turns in arrival order with timestamps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// A single immutable entry in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    turn_id: Uuid,
    timestamp: DateTime<Utc>,
    role: TurnRole,
    text: String,
}

impl Turn {
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            turn_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            role,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(TurnRole::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(TurnRole::Model, text)
    }

    pub fn turn_id(&self) -> Uuid {
        self.turn_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn role(&self) -> TurnRole {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Conversation history for the running session.
///
/// Turns are only ever appended; insertion order is the conversation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn to the end of the history
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turns that form completed exchanges.
    ///
    /// A user turn is included only when the next turn is a model reply, so a
    /// user message whose reply failed is kept in the transcript but never replayed.
    pub fn answered_turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter().enumerate().filter_map(move |(i, turn)| {
            let keep = match turn.role {
                TurnRole::Model => true,
                TurnRole::User => self
                    .turns
                    .get(i + 1)
                    .map_or(false, |next| next.role == TurnRole::Model),
            };
            keep.then_some(turn)
        })
    }

    /// Number of user turns that never received a reply
    pub fn unanswered_count(&self) -> usize {
        let answered_users = self
            .answered_turns()
            .filter(|t| t.role == TurnRole::User)
            .count();
        let users = self.turns.iter().filter(|t| t.role == TurnRole::User).count();
        users - answered_users
    }
}
