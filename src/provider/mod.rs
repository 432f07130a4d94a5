//! Model provider layer
//!
//! Maps logical model identifiers to concrete Ollama bindings and
//! carries the HTTP client that talks to the Ollama API. The catalog
//! is built once at startup from configuration; handlers resolve
//! logical ids through it and never see concrete model names directly.

pub mod catalog;
pub mod ollama;

pub use catalog::{ChatModelInfo, ModelBinding, ModelCatalog, DEFAULT_CHAT_MODEL};
pub use ollama::{ChatMessage, OllamaClient, ProviderError};
