//! Model catalog
//!
//! The fixed set of logical model roles the application exposes:
//! general chat, reasoning chat, title generation and artifact
//! generation. Each role resolves to a `ModelBinding` naming the
//! concrete Ollama model. Users can only pick from the selectable
//! subset (`chat-model`, `chat-model-reasoning`); the other two roles
//! are internal.

use serde::Serialize;

use crate::config::ProviderConfig;

/// Logical id of the general chat role
pub const CHAT_MODEL: &str = "chat-model";
/// Logical id of the reasoning chat role
pub const CHAT_MODEL_REASONING: &str = "chat-model-reasoning";
/// Logical id of the title generation role
pub const TITLE_MODEL: &str = "title-model";
/// Logical id of the artifact generation role
pub const ARTIFACT_MODEL: &str = "artifact-model";

/// Default logical model when no `chat-model` cookie is set
pub const DEFAULT_CHAT_MODEL: &str = CHAT_MODEL;

/// Concrete backend binding for a logical model id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBinding {
    /// Ollama model name (e.g. `llama3.2:latest`)
    pub model: String,
    /// Whether the model is called with thinking enabled
    pub reasoning: bool,
}

/// Selectable catalog entry as shown in the model picker
#[derive(Debug, Clone, Serialize)]
pub struct ChatModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// The picker entries, as the frontend shows them
const SELECTABLE_MODELS: &[ChatModelInfo] = &[
    ChatModelInfo {
        id: CHAT_MODEL,
        name: "Llama 3.2",
        description: "Lightweight and fast model for general-purpose tasks.",
    },
    ChatModelInfo {
        id: CHAT_MODEL_REASONING,
        name: "Llama 3.2 Reasoning",
        description: "Uses advanced chain-of-thought reasoning for complex problems",
    },
];

/// Immutable mapping from logical model id to backend binding.
///
/// Built once at startup; there is no runtime mutation or selection
/// logic beyond `resolve`.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    chat: ModelBinding,
    reasoning: ModelBinding,
    title: ModelBinding,
    artifact: ModelBinding,
}

impl ModelCatalog {
    /// Build the catalog from provider configuration
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            chat: ModelBinding {
                model: config.chat_model.clone(),
                reasoning: false,
            },
            reasoning: ModelBinding {
                model: config.reasoning_model.clone(),
                reasoning: true,
            },
            title: ModelBinding {
                model: config.title_model.clone(),
                reasoning: false,
            },
            artifact: ModelBinding {
                model: config.artifact_model.clone(),
                reasoning: false,
            },
        }
    }

    /// Resolve a logical model id to its binding.
    ///
    /// Unknown ids do not resolve; the caller decides whether that is
    /// a validation error or a fallback to the default.
    pub fn resolve(&self, id: &str) -> Option<&ModelBinding> {
        match id {
            CHAT_MODEL => Some(&self.chat),
            CHAT_MODEL_REASONING => Some(&self.reasoning),
            TITLE_MODEL => Some(&self.title),
            ARTIFACT_MODEL => Some(&self.artifact),
            _ => None,
        }
    }

    /// Whether an id names a user-selectable chat model
    pub fn is_selectable(&self, id: &str) -> bool {
        matches!(id, CHAT_MODEL | CHAT_MODEL_REASONING)
    }

    /// The user-selectable entries with display name and description
    pub fn chat_models(&self) -> &'static [ChatModelInfo] {
        SELECTABLE_MODELS
    }

    /// Resolve the active model from an optional `chat-model` cookie
    /// value: absent or unknown resolves to the default, a valid
    /// catalog id is used verbatim.
    pub fn resolve_preference<'a>(&self, cookie_value: Option<&'a str>) -> &'a str {
        match cookie_value {
            Some(id) if self.is_selectable(id) => id,
            _ => DEFAULT_CHAT_MODEL,
        }
    }
}
