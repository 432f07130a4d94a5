//! Chat proxy endpoints
//!
//! - POST /api/chat - forward a conversation to Ollama, either as one
//!   JSON reply or as an SSE stream relaying Ollama's NDJSON lines
//! - POST /api/chat/title - one-shot title generation with the
//!   title-model role
//!
//! The proxy is stateless: conversations live client-side, and
//! upstream failures pass through as 502s without interpretation.

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::StreamExt;
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::provider::{catalog, ChatMessage, ProviderError, DEFAULT_CHAT_MODEL};

/// Request body for the chat proxy
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Logical model id; defaults to the general chat role
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: bool,
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        ApiError::upstream_error(e.to_string())
    }
}

/// POST /api/chat
///
/// Requires authentication.
pub async fn chat(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(body): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    if body.messages.is_empty() {
        return Err(ApiError::validation_error("Messages cannot be empty"));
    }

    let model_id = body.model.as_deref().unwrap_or(DEFAULT_CHAT_MODEL);
    let binding = state
        .catalog
        .resolve(model_id)
        .ok_or_else(|| ApiError::validation_error(format!("Unknown chat model: {}", model_id)))?
        .clone();

    tracing::debug!(model_id, model = %binding.model, stream = body.stream, "Chat proxy call");

    if !body.stream {
        let reply = state.ollama.chat(&binding, &body.messages).await?;
        return Ok(Json(reply).into_response());
    }

    let upstream = state.ollama.chat_stream(&binding, &body.messages).await?;
    let byte_stream = upstream.bytes_stream();

    // Relay Ollama's NDJSON lines as SSE data events. Chunks can split
    // both lines and UTF-8 sequences, so bytes are buffered until a
    // full line is available.
    let event_stream = async_stream::stream! {
        tokio::pin!(byte_stream);

        let mut buffer = String::new();
        let mut byte_buffer: Vec<u8> = Vec::new();

        while let Some(chunk_result) = byte_stream.next().await {
            match chunk_result {
                Ok(bytes) => {
                    byte_buffer.extend_from_slice(&bytes);

                    let valid_up_to = match std::str::from_utf8(&byte_buffer) {
                        Ok(s) => {
                            buffer.push_str(s);
                            byte_buffer.len()
                        }
                        Err(e) => {
                            let valid = e.valid_up_to();
                            if valid > 0 {
                                buffer.push_str(std::str::from_utf8(&byte_buffer[..valid]).unwrap());
                            }
                            valid
                        }
                    };

                    if valid_up_to < byte_buffer.len() {
                        byte_buffer = byte_buffer[valid_up_to..].to_vec();
                    } else {
                        byte_buffer.clear();
                    }

                    while let Some(pos) = buffer.find('\n') {
                        let line = buffer[..pos].trim().to_string();
                        buffer = buffer[pos + 1..].to_string();
                        if !line.is_empty() {
                            yield Ok::<_, std::convert::Infallible>(Event::default().data(line));
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Upstream stream error: {}", e);
                    yield Ok(Event::default().event("error").data(e.to_string()));
                    break;
                }
            }
        }

        // Flush a trailing line without a newline terminator
        let rest = buffer.trim();
        if !rest.is_empty() {
            yield Ok(Event::default().data(rest.to_string()));
        }
    };

    Ok(Sse::new(event_stream)
        .keep_alive(KeepAlive::default())
        .into_response())
}

/// Request body for title generation
#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub message: String,
}

/// POST /api/chat/title
///
/// Requires authentication. Generates a short conversation title from
/// the user's first message.
pub async fn generate_title(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(body): Json<TitleRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.message.trim().is_empty() {
        return Err(ApiError::validation_error("Message cannot be empty"));
    }

    let binding = state
        .catalog
        .resolve(catalog::TITLE_MODEL)
        .ok_or_else(|| ApiError::internal_error("Title model not configured"))?
        .clone();

    let title = state.ollama.generate_title(&binding, &body.message).await?;

    Ok(Json(serde_json::json!({ "title": title })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_util::{
        register_and_login, spawn_mock_ollama, test_server, test_server_with_provider,
    };
    use crate::config::ProviderConfig;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_chat_requires_auth() {
        let (server, _state) = test_server().await;

        server
            .post("/api/chat")
            .json(&json!({"messages": [{"role": "user", "content": "hi"}]}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_chat_rejects_unknown_model() {
        let (server, _state) = test_server().await;
        let token = register_and_login(&server, "user@example.com").await;

        let response = server
            .post("/api/chat")
            .authorization_bearer(&token)
            .json(&json!({
                "model": "gpt-4",
                "messages": [{"role": "user", "content": "hi"}]
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_messages() {
        let (server, _state) = test_server().await;
        let token = register_and_login(&server, "user@example.com").await;

        let response = server
            .post("/api/chat")
            .authorization_bearer(&token)
            .json(&json!({"messages": []}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_relays_upstream_json() {
        let base_url = spawn_mock_ollama().await;
        let (server, _state) =
            test_server_with_provider(ProviderConfig {
                base_url,
                ..ProviderConfig::default()
            })
            .await;
        let token = register_and_login(&server, "user@example.com").await;

        let response = server
            .post("/api/chat")
            .authorization_bearer(&token)
            .json(&json!({"messages": [{"role": "user", "content": "hi"}]}))
            .await;

        response.assert_status_ok();
        let reply: serde_json::Value = response.json();
        assert_eq!(reply["message"]["content"], "mock reply");
        // Default logical id maps to the configured chat binding
        assert_eq!(reply["model"], "llama3.2:latest");
        assert_eq!(reply["think"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_chat_reasoning_model_sends_think() {
        let base_url = spawn_mock_ollama().await;
        let (server, _state) =
            test_server_with_provider(ProviderConfig {
                base_url,
                ..ProviderConfig::default()
            })
            .await;
        let token = register_and_login(&server, "user@example.com").await;

        let response = server
            .post("/api/chat")
            .authorization_bearer(&token)
            .json(&json!({
                "model": "chat-model-reasoning",
                "messages": [{"role": "user", "content": "hi"}]
            }))
            .await;

        response.assert_status_ok();
        let reply: serde_json::Value = response.json();
        assert_eq!(reply["model"], "qwen3:14b");
        assert_eq!(reply["think"], true);
    }

    #[tokio::test]
    async fn test_chat_upstream_error_is_502() {
        let base_url = spawn_mock_ollama().await;
        // "boom" makes the mock upstream answer 500
        let (server, _state) = test_server_with_provider(ProviderConfig {
            base_url,
            chat_model: "boom".to_string(),
            ..ProviderConfig::default()
        })
        .await;
        let token = register_and_login(&server, "user@example.com").await;

        let response = server
            .post("/api/chat")
            .authorization_bearer(&token)
            .json(&json!({"messages": [{"role": "user", "content": "hi"}]}))
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        let error: serde_json::Value = response.json();
        assert_eq!(error["error"]["code"], "UPSTREAM_ERROR");
        // Upstream body passes through uninterpreted
        assert!(error["error"]["message"]
            .as_str()
            .unwrap()
            .contains("kaboom"));
    }

    #[tokio::test]
    async fn test_chat_stream_relays_ndjson_as_sse() {
        let base_url = spawn_mock_ollama().await;
        let (server, _state) =
            test_server_with_provider(ProviderConfig {
                base_url,
                ..ProviderConfig::default()
            })
            .await;
        let token = register_and_login(&server, "user@example.com").await;

        let response = server
            .post("/api/chat")
            .authorization_bearer(&token)
            .json(&json!({
                "messages": [{"role": "user", "content": "hi"}],
                "stream": true
            }))
            .await;

        response.assert_status_ok();
        let content_type = response.header(axum::http::header::CONTENT_TYPE);
        assert!(content_type.to_str().unwrap().starts_with("text/event-stream"));

        let text = response.text();
        // One SSE data event per NDJSON line, relayed verbatim
        assert_eq!(text.matches("data: ").count(), 2);
        assert!(text.contains("Hel"));
        assert!(text.contains(r#""done":true"#) || text.contains(r#""done": true"#));
    }

    #[tokio::test]
    async fn test_title_generation() {
        let base_url = spawn_mock_ollama().await;
        let (server, _state) =
            test_server_with_provider(ProviderConfig {
                base_url,
                ..ProviderConfig::default()
            })
            .await;
        let token = register_and_login(&server, "user@example.com").await;

        let response = server
            .post("/api/chat/title")
            .authorization_bearer(&token)
            .json(&json!({"message": "How do lifetimes work in Rust?"}))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["title"], "mock reply");
    }

    #[tokio::test]
    async fn test_title_rejects_empty_message() {
        let (server, _state) = test_server().await;
        let token = register_and_login(&server, "user@example.com").await;

        let response = server
            .post("/api/chat/title")
            .authorization_bearer(&token)
            .json(&json!({"message": "   "}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
