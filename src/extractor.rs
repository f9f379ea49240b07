//! Detail Extractor
//!
//! Asks the extractor connection for a fixed five-key JSON object describing
//! personal and financial details found in a single user message.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AssistantError;
use crate::gemini::{Content, GenerateRequest, ModelClient, JSON_MIME_TYPE};
use crate::memory::TurnRole;
use crate::profile::ProfileField;

/// Details pulled from one user message. Missing values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDetails {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub account_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub goal: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub contact: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub other_details: Option<String>,
}

impl ExtractedDetails {
    pub fn get(&self, field: ProfileField) -> Option<&str> {
        match field {
            ProfileField::Name => self.name.as_deref(),
            ProfileField::AccountNumber => self.account_number.as_deref(),
            ProfileField::Goal => self.goal.as_deref(),
            ProfileField::Contact => self.contact.as_deref(),
            ProfileField::OtherDetails => self.other_details.as_deref(),
        }
    }

    /// True when the model found nothing at all
    pub fn is_empty(&self) -> bool {
        ProfileField::ALL.iter().all(|field| self.get(*field).is_none())
    }
}

/// Null, blank strings, `false`, zero and empty containers all mean "not found".
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_text))
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) => (n.as_f64() != Some(0.0)).then(|| n.to_string()),
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(value_to_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(map) => (!map.is_empty()).then(|| Value::Object(map).to_string()),
    }
}

pub struct DetailExtractor {
    model: String,
}

impl DetailExtractor {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    /// Extract details, reporting why extraction failed.
    pub async fn try_extract(
        &self,
        client: &dyn ModelClient,
        text: &str,
    ) -> crate::Result<ExtractedDetails> {
        let mut request = GenerateRequest::new(
            self.model.clone(),
            vec![Content::text(TurnRole::User, build_prompt(text))],
        );
        request.response_mime_type = Some(JSON_MIME_TYPE.to_string());

        let raw = client
            .generate_content(&request)
            .await
            .map_err(|e| AssistantError::Extraction(e.to_string()))?;

        let details = parse_details(&raw)?;
        debug!(empty = details.is_empty(), "Details extracted");
        Ok(details)
    }

    /// Best-effort extraction: any failure is logged and yields `None`.
    pub async fn extract(&self, client: &dyn ModelClient, text: &str) -> Option<ExtractedDetails> {
        match self.try_extract(client, text).await {
            Ok(details) => Some(details),
            Err(e) => {
                warn!("Detail extraction failed: {}", e);
                None
            }
        }
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        r#"Analyze the following text from a user. Extract any important personal
details such as name, account number, specific financial goal,
or contact information.

Respond in JSON format with keys "name", "account_number", "goal",
"contact", or "other_details". If no information is found for a key,
use null.

Text: "{}"

JSON:"#,
        text
    )
}

/// Parse the model output, tolerating a ```json fence or a one-element array.
pub fn parse_details(raw: &str) -> crate::Result<ExtractedDetails> {
    let body = strip_code_fence(raw);

    let value: Value = serde_json::from_str(body)
        .map_err(|e| AssistantError::Extraction(format!("invalid JSON: {}", e)))?;

    let object = match value {
        Value::Object(_) => value,
        Value::Array(mut items) if !items.is_empty() && items[0].is_object() => {
            items.swap_remove(0)
        }
        other => {
            return Err(AssistantError::Extraction(format!(
                "expected a JSON object, got {}",
                other
            )))
        }
    };

    serde_json::from_value(object)
        .map_err(|e| AssistantError::Extraction(format!("unexpected shape: {}", e)))
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_fence) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let after_tag = after_fence
        .strip_prefix("json")
        .or_else(|| after_fence.strip_prefix("JSON"))
        .unwrap_or(after_fence)
        .trim();
    after_tag.strip_suffix("```").unwrap_or(after_tag).trim()
}
