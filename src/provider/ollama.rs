//! Ollama HTTP client
//!
//! Thin client for the Ollama `/api/chat` endpoint. Failures inside
//! Ollama are not interpreted here: an upstream error status becomes
//! `ProviderError::Upstream` with the body text attached, and the API
//! layer passes it through as a 502.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::catalog::ModelBinding;

/// Instructions for the title-model call, applied to the first user
/// message of a conversation.
const TITLE_SYSTEM_PROMPT: &str = "Generate a short title summarizing the user's message. \
    Keep it under 80 characters. Do not use quotes or colons.";

/// Maximum title length after cleanup
const TITLE_MAX_CHARS: usize = 80;

/// A single chat message as sent to and received from Ollama
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
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

/// Errors from the Ollama client
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Request could not be sent or the response body could not be read
    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Ollama returned a non-success status
    #[error("Upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Response arrived but did not have the expected shape
    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),
}

/// Client for the Ollama chat API
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a client for the given base URL (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// The configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_body(binding: &ModelBinding, messages: &[ChatMessage], stream: bool) -> Value {
        let mut body = json!({
            "model": binding.model,
            "messages": messages,
            "stream": stream,
        });
        if binding.reasoning {
            body["think"] = json!(true);
        }
        body
    }

    /// Non-streaming chat call; relays Ollama's JSON reply verbatim.
    pub async fn chat(
        &self,
        binding: &ModelBinding,
        messages: &[ChatMessage],
    ) -> Result<Value, ProviderError> {
        let body = Self::chat_body(binding, messages, false);

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream { status, body });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Streaming chat call; returns the open upstream response whose
    /// body is Ollama's NDJSON line stream.
    pub async fn chat_stream(
        &self,
        binding: &ModelBinding,
        messages: &[ChatMessage],
    ) -> Result<reqwest::Response, ProviderError> {
        let body = Self::chat_body(binding, messages, true);

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream { status, body });
        }

        Ok(response)
    }

    /// Generate a conversation title from the user's first message
    /// using the title-model binding.
    pub async fn generate_title(
        &self,
        binding: &ModelBinding,
        message: &str,
    ) -> Result<String, ProviderError> {
        let messages = [
            ChatMessage::new("system", TITLE_SYSTEM_PROMPT),
            ChatMessage::new("user", message),
        ];

        let reply = self.chat(binding, &messages).await?;

        let content = reply["message"]["content"].as_str().ok_or_else(|| {
            ProviderError::InvalidResponse("missing message.content in chat reply".to_string())
        })?;

        Ok(clean_title(content))
    }
}

/// Normalize a model-generated title: single line, no quotes or
/// colons, at most 80 characters.
fn clean_title(raw: &str) -> String {
    let first_line = raw.lines().find(|l| !l.trim().is_empty()).unwrap_or("");

    let cleaned: String = first_line
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | ':'))
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.chars().count() > TITLE_MAX_CHARS {
        cleaned.chars().take(TITLE_MAX_CHARS).collect()
    } else {
        cleaned.to_string()
    }
}
