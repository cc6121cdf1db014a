//! HTTP plumbing shared by the provider adapters

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::warn;

use crate::backend::traits::BackendResult;
use crate::config::ProviderConfig;
use crate::error::{AppError, Result};

/// Longest slice of an error body quoted back in a failure reason
const BODY_EXCERPT_CHARS: usize = 200;

/// Build the HTTP client for one provider, with its request timeout applied
pub fn build_client(config: &ProviderConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Failure reason for a request that never produced a response
pub fn transport_failure(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        format!("request failed: {}", error)
    }
}

/// Failure reason for a non-2xx response
pub fn status_failure(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return format!("provider returned {}", status);
    }

    let excerpt: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
    if excerpt.len() < body.len() {
        format!("provider returned {}: {}…", status, excerpt)
    } else {
        format!("provider returned {}: {}", status, excerpt)
    }
}

/// A decoded provider response that may still hold no usable answer
pub trait ProviderReply: DeserializeOwned {
    /// The answer text, or the failure reason when there is none
    fn into_text(self) -> std::result::Result<String, String>;
}

/// Send a prepared request and turn whatever comes back into a `BackendResult`
pub async fn execute<R: ProviderReply>(provider: &str, request: RequestBuilder) -> BackendResult {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(provider = %provider, error = %e, "Provider request failed");
            return BackendResult::failure(provider, transport_failure(&e));
        }
    };

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(provider = %provider, status = %status, "Provider returned an error status");
        return BackendResult::failure(provider, status_failure(status, &body));
    }

    let parsed = match response.json::<R>().await {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(provider = %provider, error = %e, "Failed to parse provider response");
            return BackendResult::failure(provider, format!("malformed response: {}", e));
        }
    };

    match parsed.into_text() {
        Ok(text) => BackendResult::success(provider, text),
        Err(reason) => {
            warn!(provider = %provider, reason = %reason, "Unusable provider response");
            BackendResult::failure(provider, reason)
        }
    }
}
