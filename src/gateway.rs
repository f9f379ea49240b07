//! Model Gateway
//!
//! Owns the two independent connections to the model service: the chat
//! connection and the extractor connection. Both are released exactly once,
//! either by an explicit `shutdown` or when the gateway is dropped.

use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::error::AssistantError;
use crate::gemini::{GeminiClient, ModelClient};

/// Settings the chat connection is bound to
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub model: String,
    pub system_instruction: String,
    pub temperature: f32,
}

pub struct ModelGateway {
    chat: Arc<dyn ModelClient>,
    extractor: Arc<dyn ModelClient>,
    settings: ChatSettings,
    released: bool,
}

impl ModelGateway {
    /// Open both Gemini connections. Fails if either credential is empty.
    pub fn initialize(config: &Config) -> crate::Result<Self> {
        if config.chat_api_key.trim().is_empty() {
            return Err(AssistantError::Configuration(
                "chat API key is empty".to_string(),
            ));
        }
        if config.extractor_api_key.trim().is_empty() {
            return Err(AssistantError::Configuration(
                "extractor API key is empty".to_string(),
            ));
        }

        let chat = GeminiClient::new(
            "chat",
            config.chat_api_key.clone(),
            config.base_url.clone(),
            config.request_timeout,
        )?;
        let extractor = GeminiClient::new(
            "extractor",
            config.extractor_api_key.clone(),
            config.base_url.clone(),
            config.request_timeout,
        )?;

        info!(model = %config.model, "Model gateway initialized");

        Ok(Self::with_clients(
            Arc::new(chat),
            Arc::new(extractor),
            ChatSettings {
                model: config.model.clone(),
                system_instruction: config.system_instruction.clone(),
                temperature: config.temperature,
            },
        ))
    }

    pub fn with_clients(
        chat: Arc<dyn ModelClient>,
        extractor: Arc<dyn ModelClient>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            chat,
            extractor,
            settings,
            released: false,
        }
    }

    pub fn chat(&self) -> &dyn ModelClient {
        self.chat.as_ref()
    }

    pub fn extractor(&self) -> &dyn ModelClient {
        self.extractor.as_ref()
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Release both connections. Repeated calls are no-ops.
    pub fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.chat.close();
        self.extractor.close();
        info!("Model gateway shut down");
    }
}

impl Drop for ModelGateway {
    fn drop(&mut self) {
        self.shutdown();
    }
}
