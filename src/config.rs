//! Startup configuration
//!
//! Both credentials are required; everything else has a default.

use std::env;
use std::time::Duration;

use crate::error::AssistantError;

pub const CHAT_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const EXTRACTOR_API_KEY_VAR: &str = "GEMINI_EXTRACTOR_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

pub const SYSTEM_INSTRUCTION: &str = "You are an AI assistant for a financial services company. \
Your role is to answer user queries about finance, banking, and investments. \
Be polite, clear, and professional.";

#[derive(Debug, Clone)]
pub struct Config {
    pub chat_api_key: String,
    pub extractor_api_key: String,
    pub model: String,
    pub base_url: String,
    pub system_instruction: String,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment, honoring a `.env` file.
    pub fn from_env() -> crate::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let chat_api_key = required(&lookup, CHAT_API_KEY_VAR)?;
        let extractor_api_key = required(&lookup, EXTRACTOR_API_KEY_VAR)?;

        let model = optional(&lookup, MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = optional(&lookup, BASE_URL_VAR)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            chat_api_key,
            extractor_api_key,
            model,
            base_url,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(60),
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> crate::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key)
        .ok_or_else(|| AssistantError::Configuration(format!("{} not found.", key)))
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
