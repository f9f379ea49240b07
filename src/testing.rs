//! Scripted model client for unit tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::AssistantError;
use crate::gateway::{ChatSettings, ModelGateway};
use crate::gemini::{GenerateRequest, ModelClient};

/// Replays queued replies in order and records every request it sees.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<GenerateRequest>>,
    closes: AtomicUsize,
}

impl ScriptedClient {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn reply(self: &Arc<Self>, text: &str) -> Arc<Self> {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
        Arc::clone(self)
    }

    pub(crate) fn fail(self: &Arc<Self>, message: &str) -> Arc<Self> {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
        Arc::clone(self)
    }

    pub(crate) fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn generate_content(&self, request: &GenerateRequest) -> crate::Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(AssistantError::Upstream(message)),
            None => Err(AssistantError::Upstream("no scripted reply".to_string())),
        }
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn test_settings() -> ChatSettings {
    ChatSettings {
        model: "test-model".to_string(),
        system_instruction: "You are a test assistant".to_string(),
        temperature: 0.3,
    }
}

pub(crate) fn test_gateway(
    chat: &Arc<ScriptedClient>,
    extractor: &Arc<ScriptedClient>,
) -> ModelGateway {
    ModelGateway::with_clients(
        Arc::clone(chat) as Arc<dyn ModelClient>,
        Arc::clone(extractor) as Arc<dyn ModelClient>,
        test_settings(),
    )
}

/// Never answers; used to interrupt a request in flight.
#[derive(Default)]
pub(crate) struct StalledClient {
    closes: AtomicUsize,
}

impl StalledClient {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for StalledClient {
    async fn generate_content(&self, _request: &GenerateRequest) -> crate::Result<String> {
        std::future::pending().await
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
