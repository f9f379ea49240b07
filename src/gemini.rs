//! Gemini API client
//!
//! `ModelClient` is the seam between the assistant and the hosted model service.
//! `GeminiClient` implements it over the REST `generateContent` endpoint with a
//! long-lived reqwest::Client for connection pooling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::AssistantError;
use crate::memory::TurnRole;

pub const JSON_MIME_TYPE: &str = "application/json";

/// A single `generateContent` call, independent of transport.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub contents: Vec<Content>,
    pub system_instruction: Option<String>,
    pub temperature: Option<f32>,
    pub response_mime_type: Option<String>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self {
            model: model.into(),
            contents,
            system_instruction: None,
            temperature: None,
            response_mime_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: TurnRole,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// Connection to the hosted model service
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one request and return the generated text.
    async fn generate_content(&self, request: &GenerateRequest) -> crate::Result<String>;

    /// Release the connection. Later requests fail.
    fn close(&self);
}

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    label: &'static str,
    closed: AtomicBool,
}

impl GeminiClient {
    pub fn new(
        label: &'static str,
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
            label,
            closed: AtomicBool::new(false),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate_content(&self, request: &GenerateRequest) -> crate::Result<String> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AssistantError::Upstream(format!(
                "{} connection closed",
                self.label
            )));
        }

        let body = GeminiRequest::from(request);

        debug!(
            connection = self.label,
            model = %request.model,
            contents = request.contents.len(),
            "Calling Gemini API"
        );

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(connection = self.label, "Gemini API request failed: {}", e);
                AssistantError::Upstream(format!("Gemini API error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(connection = self.label, %status, "Gemini API error response: {}", error_text);
            return Err(AssistantError::Upstream(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!(connection = self.label, "Failed to parse Gemini response: {}", e);
            AssistantError::Upstream(format!("Gemini parse error: {}", e))
        })?;

        if let Some(usage) = &gemini_response.usage_metadata {
            debug!(
                connection = self.label,
                prompt_tokens = usage.prompt_token_count.unwrap_or(0),
                candidate_tokens = usage.candidates_token_count.unwrap_or(0),
                "Gemini usage"
            );
        }

        extract_reply_text(gemini_response)
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!(connection = self.label, "Gemini connection released");
        }
    }
}

/// Pull the generated text out of a response, rejecting blocked or empty replies.
fn extract_reply_text(response: GeminiResponse) -> crate::Result<String> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
    {
        return Err(AssistantError::Upstream(format!(
            "Prompt blocked by Gemini: {}",
            reason
        )));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AssistantError::Upstream("No response from Gemini API".to_string()))?;

    match candidate.finish_reason.as_deref() {
        None | Some("STOP") => {}
        Some(reason) => warn!("Gemini finished with reason {}", reason),
    }

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AssistantError::Upstream(
            "Empty response from Gemini".to_string(),
        ));
    }

    Ok(text)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "GenerationConfig::is_empty")]
    generation_config: GenerationConfig,
}

impl<'a> From<&'a GenerateRequest> for GeminiRequest<'a> {
    fn from(request: &'a GenerateRequest) -> Self {
        Self {
            contents: &request.contents,
            system_instruction: request.system_instruction.as_ref().map(|text| {
                SystemInstruction {
                    parts: vec![Part { text: text.clone() }],
                }
            }),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type: request.response_mime_type.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

impl GenerationConfig {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.response_mime_type.is_none()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}
