//! Model catalog endpoints
//!
//! - GET /api/models - the selectable catalog plus the default id
//! - POST /api/models/select - persist a model choice in the
//!   `chat-model` cookie

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::entry::CHAT_MODEL_COOKIE;
use crate::api::middleware::{ApiError, AppState};
use crate::provider::{ChatModelInfo, DEFAULT_CHAT_MODEL};

/// Preference cookie lifetime in seconds (one year)
const MODEL_COOKIE_MAX_AGE: i64 = 365 * 24 * 60 * 60;

/// Response for the catalog listing
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: &'static [ChatModelInfo],
    pub default_model: &'static str,
}

/// GET /api/models
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.catalog.chat_models(),
        default_model: DEFAULT_CHAT_MODEL,
    })
}

/// Request body for model selection
#[derive(Debug, Deserialize)]
pub struct SelectModelRequest {
    pub model: String,
}

/// POST /api/models/select
///
/// The cookie is deliberately not HttpOnly: the frontend reads it to
/// highlight the active entry in the picker.
pub async fn select_model(
    State(state): State<AppState>,
    Json(body): Json<SelectModelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.catalog.is_selectable(&body.model) {
        return Err(ApiError::validation_error(format!(
            "Unknown chat model: {}",
            body.model
        )));
    }

    let cookie = format!(
        "{}={}; Path=/; SameSite=Lax; Max-Age={}",
        CHAT_MODEL_COOKIE, body.model, MODEL_COOKIE_MAX_AGE
    );

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }

    Ok((headers, Json(serde_json::json!({ "model": body.model }))))
}
