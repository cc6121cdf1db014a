//! Unit tests for configuration module

use chat_relay_gateway::config::{ProviderKind, Settings};
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();

    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.logging.format, "json");
    assert_eq!(settings.chat.max_fragment_len, 4000);
    assert!(settings.chat.default_mode.is_none());

    let ids: Vec<_> = settings.providers.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["gemini", "grok"]);
}

#[test]
fn test_missing_file_uses_defaults() {
    let settings = Settings::load_from_path("does/not/exist.yaml").unwrap();

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.providers.len(), 2);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_load_yaml_file() {
    let file = write_config(
        r#"
server:
  port: 9090
chat:
  max_fragment_len: 1000
  default_mode: all
providers:
  - id: local
    display_name: Local Llama
    kind: openai
    endpoint: http://localhost:8000/v1
    model: llama-3
    timeout_ms: 45000
    auth:
      api_key: sk-local
  - id: gemini
    kind: gemini
    endpoint: https://generativelanguage.googleapis.com/v1beta
    model: gemini-1.5-flash
    enabled: false
"#,
    );

    let settings = Settings::load_from_path(file.path()).unwrap();

    assert_eq!(settings.server.port, 9090);
    assert_eq!(settings.chat.max_fragment_len, 1000);
    assert_eq!(settings.chat.default_mode.as_deref(), Some("all"));
    assert_eq!(settings.providers.len(), 2);

    let local = &settings.providers[0];
    assert_eq!(local.kind, ProviderKind::OpenAI);
    assert_eq!(local.label(), "Local Llama");
    assert_eq!(local.timeout_ms, 45000);
    assert_eq!(local.auth.resolve().as_deref(), Some("sk-local"));

    assert!(!settings.providers[1].enabled);
    assert_eq!(settings.enabled_providers().count(), 1);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_placeholder_key_resolves_to_none() {
    let mut settings = Settings::default();
    settings.providers[1].auth.token_env = None;
    settings.providers[1].auth.api_key = Some("your_grok_api_key_here".to_string());

    assert!(settings.providers[1].auth.resolve().is_none());
}

#[test]
fn test_validation_invalid_port() {
    let mut settings = Settings::default();
    settings.server.port = 0;
    assert!(settings.validate().is_err());
}

#[test]
fn test_validation_zero_fragment_len() {
    let mut settings = Settings::default();
    settings.chat.max_fragment_len = 0;
    assert!(settings.validate().is_err());
}

#[test]
fn test_validation_duplicate_provider() {
    let mut settings = Settings::default();
    let duplicate = settings.providers[0].clone();
    settings.providers.push(duplicate);
    assert!(settings.validate().is_err());
}

#[test]
fn test_validation_empty_model() {
    let mut settings = Settings::default();
    settings.providers[0].model = String::new();
    assert!(settings.validate().is_err());
}

#[test]
fn test_validation_invalid_auth_header_name() {
    let mut settings = Settings::default();
    settings.providers[1].auth.header_name = Some("x api key".to_string());
    assert!(settings.validate().is_err());

    settings.providers[1].auth.header_name = Some("x-api-key".to_string());
    assert!(settings.validate().is_ok());
}

#[test]
fn test_validation_unknown_default_mode() {
    let mut settings = Settings::default();
    settings.chat.default_mode = Some("claude".to_string());
    assert!(settings.validate().is_err());

    settings.chat.default_mode = Some("grok".to_string());
    assert!(settings.validate().is_ok());
}
