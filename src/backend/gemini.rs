//! Google Gemini `generateContent` adapter

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::client::{build_client, execute, ProviderReply};
use crate::backend::traits::{BackendAdapter, BackendResult, EMPTY_PROMPT, NOT_CONFIGURED};
use crate::config::ProviderConfig;
use crate::error::Result;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl ProviderReply for GenerateContentResponse {
    fn into_text(self) -> std::result::Result<String, String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(format!("refused by provider: prompt blocked ({})", reason));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| "malformed response: no candidates".to_string())?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err("refused by provider: response blocked for safety".to_string());
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err("malformed response: candidate has no text".to_string());
        }
        Ok(text)
    }
}

/// Adapter for the Gemini REST API
pub struct GeminiBackend {
    id: String,
    display_name: String,
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    system_prompt: Option<String>,
    api_key: Option<String>,
}

impl GeminiBackend {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            id: config.id.clone(),
            display_name: config.label().to_string(),
            client: build_client(config)?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.trim_start_matches("models/").to_string(),
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
            api_key: config.auth.resolve(),
        })
    }

    fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::text(Some("user"), prompt)],
            system_instruction: self
                .system_prompt
                .as_deref()
                .map(|system| Content::text(None, system)),
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl BackendAdapter for GeminiBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn protocol(&self) -> &str {
        "gemini"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn invoke(&self, prompt: &str) -> BackendResult {
        let Some(key) = &self.api_key else {
            return BackendResult::failure(&self.id, NOT_CONFIGURED);
        };
        if prompt.trim().is_empty() {
            return BackendResult::failure(&self.id, EMPTY_PROMPT);
        }

        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        debug!(provider = %self.id, model = %self.model, "Sending generateContent request");

        let request = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, key.as_str())
            .json(&self.build_request(prompt));

        execute::<GenerateContentResponse>(&self.id, request).await
    }
}
