//! OpenAI-compatible chat completions.

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{parse_response, VendorError};
use crate::{env_nonempty, trim_base_url};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl LlmConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = env_nonempty("LLM_API_KEY")?;
        let model = env_nonempty("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
        let base_url = env_nonempty("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Some(Self {
            api_key,
            model,
            base_url: trim_base_url(base_url),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }

    /// Send `messages` and return the assistant's reply text.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, VendorError> {
        let body = json!({
            "model": self.config.model,
            "messages": messages,
        });
        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let completion: Value = parse_response(response).await?;
        extract_reply(&completion)
    }
}

/// Pull `choices[0].message.content` out of a completion.
pub fn extract_reply(completion: &Value) -> Result<String, VendorError> {
    completion
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| VendorError::Decode("completion has no message content".into()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn extracts_first_choice() {
        let completion = json!({
            "choices": [{"message": {"role": "assistant", "content": " Sessions rose 12%. "}}]
        });
        assert_eq!(extract_reply(&completion).unwrap(), "Sessions rose 12%.");
    }

    #[test]
    fn empty_choices_are_a_decode_error() {
        assert_matches!(
            extract_reply(&json!({"choices": []})),
            Err(VendorError::Decode(_))
        );
    }
}
