//! Application settings and configuration management

use crate::error::{AppError, Result};
use crate::session::RoutingMode;
use config::{Config, Environment, File, FileFormat};
use reqwest::header::HeaderName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub chat: ChatConfig,
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Chat behaviour shared by every session
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    /// Largest fragment the transport accepts, in characters
    #[serde(default = "default_max_fragment_len")]
    pub max_fragment_len: usize,
    /// Mode given to sessions that never selected one (`"all"` or a provider id)
    #[serde(default)]
    pub default_mode: Option<String>,
}

fn default_max_fragment_len() -> usize {
    4000
}

/// Provider wire protocol
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible `/chat/completions` (xAI Grok, OpenAI, vLLM, ...)
    OpenAI,
    /// Google Gemini `generateContent`
    Gemini,
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::OpenAI
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAI => write!(f, "openai"),
            ProviderKind::Gemini => write!(f, "gemini"),
        }
    }
}

/// Credential settings for a provider
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProviderAuth {
    /// Environment variable holding the API key, checked first
    #[serde(default)]
    pub token_env: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Send the key in this header instead of `Authorization: Bearer`
    #[serde(default)]
    pub header_name: Option<String>,
}

impl ProviderAuth {
    /// Resolve the usable credential, if any.
    ///
    /// Empty values and template placeholders such as `your_grok_api_key_here`
    /// count as missing.
    pub fn resolve(&self) -> Option<String> {
        let from_env = self
            .token_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !is_placeholder_credential(key));

        from_env.or_else(|| {
            self.api_key
                .clone()
                .filter(|key| !is_placeholder_credential(key))
        })
    }
}

/// Whether a credential value is blank or an unfilled template placeholder
pub fn is_placeholder_credential(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || (value.starts_with("your_") && value.ends_with("_here"))
}

/// Provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub id: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub kind: ProviderKind,

    pub endpoint: String,

    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default)]
    pub system_prompt: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub auth: ProviderAuth,
}

impl ProviderConfig {
    /// Label shown to users next to this provider's answers
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

fn default_temperature() -> f32 {
    0.7
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30000
}

/// Built-in provider declarations used when the configuration names none
pub fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            id: "gemini".to_string(),
            display_name: Some("🔷 Gemini Pro".to_string()),
            kind: ProviderKind::Gemini,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-pro".to_string(),
            temperature: default_temperature(),
            system_prompt: None,
            enabled: true,
            timeout_ms: default_timeout(),
            auth: ProviderAuth {
                token_env: Some("GEMINI_API_KEY".to_string()),
                ..Default::default()
            },
        },
        ProviderConfig {
            id: "grok".to_string(),
            display_name: Some("🤖 Grok AI".to_string()),
            kind: ProviderKind::OpenAI,
            endpoint: "https://api.x.ai/v1".to_string(),
            model: "grok-beta".to_string(),
            temperature: default_temperature(),
            system_prompt: Some("You are a helpful AI assistant.".to_string()),
            enabled: true,
            timeout_ms: default_timeout(),
            auth: ProviderAuth {
                token_env: Some("GROK_API_KEY".to_string()),
                ..Default::default()
            },
        },
    ]
}

impl Settings {
    /// Load settings from the default configuration file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/gateway.yaml")
    }

    /// Load settings from a specific configuration file (YAML or TOML)
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let format = if path.extension().map_or(false, |ext| ext == "yaml" || ext == "yml") {
            FileFormat::Yaml
        } else {
            FileFormat::Toml
        };

        let mut config_builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            .set_default("chat.max_fragment_len", default_max_fragment_len() as i64)?;

        if path.exists() {
            config_builder = config_builder.add_source(File::from(path).format(format));
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix("CHAT_RELAY")
                .separator("__")
                .try_parsing(true),
        );

        let config = config_builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("Server port cannot be 0".to_string()));
        }

        if self.chat.max_fragment_len == 0 {
            return Err(invalid("chat.max_fragment_len must be positive".to_string()));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if provider.id.trim().is_empty() {
                return Err(invalid("Provider id cannot be empty".to_string()));
            }
            if !seen.insert(provider.id.as_str()) {
                return Err(invalid(format!("Duplicate provider id '{}'", provider.id)));
            }
            if provider.endpoint.trim().is_empty() {
                return Err(invalid(format!(
                    "Provider '{}' must have an endpoint",
                    provider.id
                )));
            }
            if provider.model.trim().is_empty() {
                return Err(invalid(format!(
                    "Provider '{}' must name a model",
                    provider.id
                )));
            }
            if let Some(name) = &provider.auth.header_name {
                if HeaderName::from_bytes(name.as_bytes()).is_err() {
                    return Err(invalid(format!(
                        "Provider '{}' has an invalid auth header name '{}'",
                        provider.id, name
                    )));
                }
            }
        }

        if let Some(mode) = &self.chat.default_mode {
            let mode: RoutingMode = mode
                .parse()
                .map_err(|e: AppError| invalid(format!("chat.default_mode: {}", e)))?;
            if let RoutingMode::SingleBackend(id) = &mode {
                if !self.enabled_providers().any(|p| &p.id == id) {
                    return Err(invalid(format!(
                        "chat.default_mode names unknown provider '{}'",
                        id
                    )));
                }
            }
        }

        Ok(())
    }

    /// Providers that are switched on, in declaration order
    pub fn enabled_providers(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.iter().filter(|p| p.enabled)
    }
}

fn invalid(message: String) -> AppError {
    AppError::Config(config::ConfigError::Message(message))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
            chat: ChatConfig {
                max_fragment_len: default_max_fragment_len(),
                default_mode: None,
            },
            providers: default_providers(),
        }
    }
}
