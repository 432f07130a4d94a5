//! Service status endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::middleware::AppState;
use crate::provider::DEFAULT_CHAT_MODEL;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub default_chat_model: &'static str,
    pub provider_base_url: String,
}

/// GET /api/status
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        default_chat_model: DEFAULT_CHAT_MODEL,
        provider_base_url: state.ollama.base_url().to_string(),
    })
}
