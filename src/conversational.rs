//! Conversation Session
//!
//! Owns the turn history and drives the chat connection. Every request carries
//! the system instruction, the temperature and the answered exchanges so far.

use std::iter;
use tracing::{debug, error, info};

use crate::error::AssistantError;
use crate::gateway::ChatSettings;
use crate::gemini::{Content, GenerateRequest, ModelClient};
use crate::memory::{ConversationHistory, Turn, TurnRole};

pub struct ConversationSession {
    settings: ChatSettings,
    history: ConversationHistory,
}

impl ConversationSession {
    pub fn new(settings: ChatSettings) -> Self {
        Self {
            settings,
            history: ConversationHistory::new(),
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Send a user message and return the model's reply.
    ///
    /// The user turn is recorded even when the call fails; the model turn only
    /// on success.
    pub async fn send_user_message(
        &mut self,
        chat: &dyn ModelClient,
        text: &str,
    ) -> crate::Result<String> {
        let request = self.build_request(text);
        let user_turn = Turn::user(text);
        let user_turn_id = user_turn.turn_id();
        debug!(turn_id = %user_turn_id, at = %user_turn.timestamp(), "User turn recorded");
        self.history.push(user_turn);

        match chat.generate_content(&request).await {
            Ok(reply) => {
                let model_turn = Turn::model(reply.clone());
                info!(
                    turn_id = %model_turn.turn_id(),
                    reply_to = %user_turn_id,
                    at = %model_turn.timestamp(),
                    turns = self.history.len() + 1,
                    "Chat reply received"
                );
                self.history.push(model_turn);
                Ok(reply)
            }
            Err(e) => {
                error!(
                    turn_id = %user_turn_id,
                    unanswered = self.history.unanswered_count(),
                    "Chat send failed: {}", e
                );
                Err(match e {
                    AssistantError::Upstream(_) => e,
                    other => AssistantError::Upstream(other.to_string()),
                })
            }
        }
    }

    fn build_request(&self, text: &str) -> GenerateRequest {
        let contents = self
            .history
            .answered_turns()
            .map(|turn| Content::text(turn.role(), turn.text()))
            .chain(iter::once(Content::text(TurnRole::User, text)))
            .collect();

        let mut request = GenerateRequest::new(self.settings.model.clone(), contents);
        request.system_instruction = Some(self.settings.system_instruction.clone());
        request.temperature = Some(self.settings.temperature);
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_settings, ScriptedClient};

    #[tokio::test]
    async fn test_history_grows_two_per_successful_turn() {
        let chat = ScriptedClient::new().reply("A1").reply("A2").reply("A3");
        let mut session = ConversationSession::new(test_settings());

        for (i, question) in ["Q1", "Q2", "Q3"].iter().enumerate() {
            let reply = session.send_user_message(&*chat, question).await.unwrap();
            assert_eq!(reply, format!("A{}", i + 1));
            assert_eq!(session.history().len(), 2 * (i + 1));
        }

        let roles: Vec<TurnRole> = session.history().turns().iter().map(|t| t.role()).collect();
        assert_eq!(
            roles,
            vec![
                TurnRole::User,
                TurnRole::Model,
                TurnRole::User,
                TurnRole::Model,
                TurnRole::User,
                TurnRole::Model
            ]
        );
    }

    #[tokio::test]
    async fn test_turns_are_distinct_and_time_ordered() {
        let chat = ScriptedClient::new().reply("Noted");
        let mut session = ConversationSession::new(test_settings());

        session.send_user_message(&*chat, "My account is 12345").await.unwrap();

        let turns = session.history().turns();
        assert_ne!(turns[0].turn_id(), turns[1].turn_id());
        assert!(turns[0].timestamp() <= turns[1].timestamp());
    }

    #[tokio::test]
    async fn test_request_carries_context_and_settings() {
        let chat = ScriptedClient::new().reply("Hi Bob").reply("Sure");
        let mut session = ConversationSession::new(test_settings());

        session.send_user_message(&*chat, "I'm Bob").await.unwrap();
        session.send_user_message(&*chat, "Help me save").await.unwrap();

        let requests = chat.requests();
        assert_eq!(requests[0].contents.len(), 1);

        let second = &requests[1];
        let texts: Vec<&str> = second
            .contents
            .iter()
            .map(|c| c.parts[0].text.as_str())
            .collect();
        assert_eq!(texts, vec!["I'm Bob", "Hi Bob", "Help me save"]);
        assert_eq!(second.contents[1].role, TurnRole::Model);
        assert_eq!(second.model, "test-model");
        assert_eq!(second.system_instruction.as_deref(), Some("You are a test assistant"));
        assert_eq!(second.temperature, Some(0.3));
        assert!(second.response_mime_type.is_none());
    }

    #[tokio::test]
    async fn test_failed_send_keeps_user_turn_only() {
        let chat = ScriptedClient::new().fail("503 unavailable").reply("Recovered");
        let mut session = ConversationSession::new(test_settings());

        let result = session.send_user_message(&*chat, "first").await;
        assert!(matches!(result, Err(AssistantError::Upstream(_))));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().last().map(|t| t.role()), Some(TurnRole::User));

        session.send_user_message(&*chat, "second").await.unwrap();
        assert_eq!(session.history().len(), 3);

        // the unanswered turn is not replayed as context
        let retry = &chat.requests()[1];
        assert_eq!(retry.contents.len(), 1);
        assert_eq!(retry.contents[0].parts[0].text, "second");
    }
}
