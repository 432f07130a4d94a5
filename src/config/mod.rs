//! Configuration management
//!
//! Loads configuration for the parley chat server from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults, so the
//! server starts with no config file at all.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// Model provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth from the frontend)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/parley.db".to_string()
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in days
    #[serde(default = "default_session_expiration_days")]
    pub expiration_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expiration_days: default_session_expiration_days(),
        }
    }
}

fn default_session_expiration_days() -> i64 {
    7
}

/// Model provider configuration.
///
/// Maps the four logical model roles to concrete Ollama model names.
/// The base URL comes from the file, overridden by `OLLAMA_BASE_URL`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Ollama base URL
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    /// Model for general chat
    #[serde(default = "default_chat_model_binding")]
    pub chat_model: String,
    /// Model for reasoning chat (called with thinking enabled)
    #[serde(default = "default_reasoning_model_binding")]
    pub reasoning_model: String,
    /// Model for conversation title generation
    #[serde(default = "default_chat_model_binding")]
    pub title_model: String,
    /// Model for artifact generation
    #[serde(default = "default_chat_model_binding")]
    pub artifact_model: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            chat_model: default_chat_model_binding(),
            reasoning_model: default_reasoning_model_binding(),
            title_model: default_chat_model_binding(),
            artifact_model: default_chat_model_binding(),
        }
    }
}

fn default_provider_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_chat_model_binding() -> String {
    "llama3.2:latest".to_string()
}

fn default_reasoning_model_binding() -> String {
    "qwen3:14b".to_string()
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file.
    ///
    /// If the file doesn't exist or is empty, returns default
    /// configuration. If the file exists but is invalid YAML, returns
    /// an error with the location of the problem.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides.
    ///
    /// Environment variables follow the pattern:
    /// - PARLEY_SERVER_HOST
    /// - PARLEY_SERVER_PORT
    /// - PARLEY_SERVER_CORS_ORIGIN
    /// - PARLEY_DATABASE_URL
    /// - PARLEY_SESSION_EXPIRATION_DAYS
    /// - PARLEY_PROVIDER_BASE_URL
    /// - PARLEY_PROVIDER_CHAT_MODEL
    /// - PARLEY_PROVIDER_REASONING_MODEL
    /// - PARLEY_PROVIDER_TITLE_MODEL
    /// - PARLEY_PROVIDER_ARTIFACT_MODEL
    ///
    /// `OLLAMA_BASE_URL` is honored as well and wins over both the file
    /// and `PARLEY_PROVIDER_BASE_URL`.
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("PARLEY_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PARLEY_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("PARLEY_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(url) = std::env::var("PARLEY_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(days) = std::env::var("PARLEY_SESSION_EXPIRATION_DAYS") {
            if let Ok(days) = days.parse::<i64>() {
                self.session.expiration_days = days;
            }
        }

        if let Ok(base_url) = std::env::var("PARLEY_PROVIDER_BASE_URL") {
            self.provider.base_url = base_url;
        }
        if let Ok(model) = std::env::var("PARLEY_PROVIDER_CHAT_MODEL") {
            self.provider.chat_model = model;
        }
        if let Ok(model) = std::env::var("PARLEY_PROVIDER_REASONING_MODEL") {
            self.provider.reasoning_model = model;
        }
        if let Ok(model) = std::env::var("PARLEY_PROVIDER_TITLE_MODEL") {
            self.provider.title_model = model;
        }
        if let Ok(model) = std::env::var("PARLEY_PROVIDER_ARTIFACT_MODEL") {
            self.provider.artifact_model = model;
        }

        // OLLAMA_BASE_URL takes precedence over everything else
        if let Ok(base_url) = std::env::var("OLLAMA_BASE_URL") {
            self.provider.base_url = base_url;
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
// Both `tests` and `property_tests` modules use this to prevent race conditions.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
const CONFIG_ENV_VARS: &[&str] = &[
    "PARLEY_SERVER_HOST",
    "PARLEY_SERVER_PORT",
    "PARLEY_SERVER_CORS_ORIGIN",
    "PARLEY_DATABASE_URL",
    "PARLEY_SESSION_EXPIRATION_DAYS",
    "PARLEY_PROVIDER_BASE_URL",
    "PARLEY_PROVIDER_CHAT_MODEL",
    "PARLEY_PROVIDER_REASONING_MODEL",
    "PARLEY_PROVIDER_TITLE_MODEL",
    "PARLEY_PROVIDER_ARTIFACT_MODEL",
    "OLLAMA_BASE_URL",
];
