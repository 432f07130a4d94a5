//! Chat entry endpoint
//!
//! `GET /` bootstraps the chat surface: it requires a session
//! (redirecting to guest auth when there is none), mints a fresh
//! conversation id, and resolves the active model preference from the
//! `chat-model` cookie.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::auth::UserResponse;
use crate::api::middleware::{cookie_value, session_token, ApiError, AppState};

/// Name of the model preference cookie
pub const CHAT_MODEL_COOKIE: &str = "chat-model";

/// Everything the chat surface needs to render a fresh conversation
#[derive(Debug, Serialize)]
pub struct ChatBootstrap {
    /// Fresh conversation id, new on every load
    pub id: String,
    /// Active model preference (a selectable catalog id)
    pub chat_model: String,
    pub initial_messages: Vec<serde_json::Value>,
    pub visibility: &'static str,
    pub read_only: bool,
    pub auto_resume: bool,
    pub user: UserResponse,
}

/// GET / - chat entry
///
/// Missing, invalid or expired sessions are control flow, not errors:
/// the visitor is sent to guest auth and no chat payload is rendered.
pub async fn chat_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let user = match session_token(&headers) {
        Some(token) => state
            .user_service
            .validate_session(&token)
            .await
            .map_err(|e| ApiError::internal_error(e.to_string()))?,
        None => None,
    };

    let Some(user) = user else {
        return Ok(Redirect::temporary("/api/auth/guest").into_response());
    };

    let id = Uuid::new_v4().to_string();

    let cookie = cookie_value(&headers, CHAT_MODEL_COOKIE);
    let chat_model = state.catalog.resolve_preference(cookie.as_deref());

    tracing::debug!(conversation_id = %id, chat_model, "Chat entry");

    Ok(Json(ChatBootstrap {
        id,
        chat_model: chat_model.to_string(),
        initial_messages: Vec::new(),
        visibility: "private",
        read_only: false,
        auto_resume: false,
        user: user.into(),
    })
    .into_response())
}
