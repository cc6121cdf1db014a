//! OpenAI-compatible chat completions adapter (xAI Grok, OpenAI, vLLM, ...)

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::client::{build_client, execute, ProviderReply};
use crate::backend::traits::{BackendAdapter, BackendResult, EMPTY_PROMPT, NOT_CONFIGURED};
use crate::config::ProviderConfig;
use crate::error::{AppError, Result};

/// Chat message for completion requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

/// Chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub stream: bool,
}

/// Chat completion response, reduced to the fields the adapter reads
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub refusal: Option<String>,
}

impl ProviderReply for ChatCompletionResponse {
    fn into_text(self) -> std::result::Result<String, String> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| "malformed response: no choices".to_string())?;

        if let Some(refusal) = choice.message.refusal.filter(|r| !r.trim().is_empty()) {
            return Err(format!("refused by provider: {}", refusal));
        }
        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err("refused by provider: content filtered".to_string());
        }

        choice
            .message
            .content
            .ok_or_else(|| "malformed response: missing message content".to_string())
    }
}

/// Adapter for any endpoint speaking the OpenAI chat completions API
pub struct OpenAICompatibleBackend {
    id: String,
    display_name: String,
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    system_prompt: Option<String>,
    api_key: Option<String>,
    auth_header_name: Option<HeaderName>,
}

impl OpenAICompatibleBackend {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let auth_header_name = config
            .auth
            .header_name
            .as_deref()
            .map(|name| {
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                    AppError::Configuration(format!(
                        "Provider '{}' has an invalid auth header name '{}'",
                        config.id, name
                    ))
                })
            })
            .transpose()?;

        Ok(Self {
            id: config.id.clone(),
            display_name: config.label().to_string(),
            client: build_client(config)?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
            api_key: config.auth.resolve(),
            auth_header_name,
        })
    }

    /// Get headers with authentication
    fn get_headers(&self, token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match &self.auth_header_name {
            Some(name) => {
                if let Ok(value) = HeaderValue::from_str(token) {
                    headers.insert(name.clone(), value);
                }
            }
            None => {
                if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                    headers.insert(AUTHORIZATION, value);
                }
            }
        }

        headers
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system_prompt {
            messages.push(ChatMessage::new("system", system));
        }
        messages.push(ChatMessage::new("user", prompt));

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            stream: false,
        }
    }
}

#[async_trait]
impl BackendAdapter for OpenAICompatibleBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn protocol(&self) -> &str {
        "openai"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn invoke(&self, prompt: &str) -> BackendResult {
        let Some(token) = &self.api_key else {
            return BackendResult::failure(&self.id, NOT_CONFIGURED);
        };
        if prompt.trim().is_empty() {
            return BackendResult::failure(&self.id, EMPTY_PROMPT);
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!(provider = %self.id, model = %self.model, "Sending chat completion request");

        let request = self
            .client
            .post(&url)
            .headers(self.get_headers(token))
            .json(&self.build_request(prompt));

        execute::<ChatCompletionResponse>(&self.id, request).await
    }
}
