//! Aggregated responses and their text rendering

use serde::Serialize;

use crate::backend::BackendResult;
use crate::session::RoutingMode;

/// Line placed between providers when several answered
pub const SEPARATOR_WIDTH: usize = 30;

/// Message sent to a user when the transport could not deliver a reply
pub const DELIVERY_FAILURE_MESSAGE: &str = "❌ Oops! Something went wrong while sending the reply.\n\n\
Please try one of these:\n\
1. 🔄 Switch to another AI\n\
2. 📝 Rephrase your question\n\
3. ⏰ Try again in a moment";

/// How an aggregated response turns into text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderPolicy {
    /// One provider: its answer as-is
    Bare,
    /// Several providers: each answer under its label, separated
    Labeled,
}

/// A provider result together with the label it is shown under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledResult {
    pub label: String,
    #[serde(flatten)]
    pub result: BackendResult,
}

/// Results of one routed message, in dispatch order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedResponse {
    /// Mode the message was dispatched under
    pub mode: RoutingMode,
    pub results: Vec<LabeledResult>,
    pub policy: RenderPolicy,
}

impl AggregatedResponse {
    pub fn new(mode: RoutingMode, results: Vec<LabeledResult>) -> Self {
        let policy = match mode {
            RoutingMode::SingleBackend(_) => RenderPolicy::Bare,
            RoutingMode::AllBackends => RenderPolicy::Labeled,
        };
        Self {
            mode,
            results,
            policy,
        }
    }

    /// Results without labels, in dispatch order
    pub fn backend_results(&self) -> impl Iterator<Item = &BackendResult> {
        self.results.iter().map(|r| &r.result)
    }

    /// Provider ids in dispatch order
    pub fn providers(&self) -> Vec<&str> {
        self.backend_results().map(BackendResult::provider).collect()
    }

    /// The single text payload handed to the chunker
    pub fn render(&self) -> String {
        match self.policy {
            RenderPolicy::Bare => self
                .results
                .iter()
                .map(render_body)
                .collect::<Vec<_>>()
                .join("\n\n"),
            RenderPolicy::Labeled => {
                let separator = format!("\n\n{}\n\n", "═".repeat(SEPARATOR_WIDTH));
                self.results
                    .iter()
                    .map(|r| format!("{}:\n{}", r.label, render_body(r)))
                    .collect::<Vec<_>>()
                    .join(&separator)
            }
        }
    }
}

fn render_body(labeled: &LabeledResult) -> String {
    match &labeled.result {
        BackendResult::Success { text, .. } => text.clone(),
        BackendResult::Failure { reason, .. } => {
            format!("❌ {} error: {}", labeled.label, reason)
        }
    }
}
