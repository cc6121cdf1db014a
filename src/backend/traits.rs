//! Backend adapter trait and result types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of one provider invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BackendResult {
    Success { provider: String, text: String },
    Failure { provider: String, reason: String },
}

impl BackendResult {
    pub fn success(provider: impl Into<String>, text: impl Into<String>) -> Self {
        BackendResult::Success {
            provider: provider.into(),
            text: text.into(),
        }
    }

    pub fn failure(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        BackendResult::Failure {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            BackendResult::Success { provider, .. } | BackendResult::Failure { provider, .. } => {
                provider
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BackendResult::Success { .. })
    }
}

/// Reason reported by adapters that have no usable credential
pub const NOT_CONFIGURED: &str = "not configured";

/// Reason reported for an empty prompt
pub const EMPTY_PROMPT: &str = "empty prompt";

/// Availability of one registered provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub id: String,
    pub display_name: String,
    pub protocol: String,
    pub available: bool,
}

/// Uniform interface to one LLM provider.
///
/// `invoke` never fails: every problem, including a missing credential, comes
/// back as `BackendResult::Failure` tagged with the provider id.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// Provider id used in routing modes
    fn id(&self) -> &str;

    /// Label shown next to this provider's answers
    fn display_name(&self) -> &str;

    /// Wire protocol name
    fn protocol(&self) -> &str;

    /// Whether a credential is configured
    fn is_available(&self) -> bool;

    /// Send one prompt and return the completion text or a failure
    async fn invoke(&self, prompt: &str) -> BackendResult;

    fn status(&self) -> ProviderStatus {
        ProviderStatus {
            id: self.id().to_string(),
            display_name: self.display_name().to_string(),
            protocol: self.protocol().to_string(),
            available: self.is_available(),
        }
    }
}
