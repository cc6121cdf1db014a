//! Session-aware message router and result aggregator

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::{BackendAdapter, BackendRegistry, BackendResult, ProviderStatus};
use crate::error::{AppError, Result};
use crate::routing::chunker::{self, Fragment};
use crate::routing::render::{AggregatedResponse, LabeledResult, DELIVERY_FAILURE_MESSAGE};
use crate::session::{RoutingMode, SessionId, SessionStore};

/// Provider availability plus the session's current selection
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub providers: Vec<ProviderStatus>,
    pub mode: RoutingMode,
    pub all_operational: bool,
}

/// Fragments of one rendered reply and the mode it was routed under
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub mode: RoutingMode,
    pub fragments: Vec<Fragment>,
}

/// Routes messages to the provider(s) selected by each session.
///
/// Holds no state of its own between calls: session modes live in the
/// `SessionStore`, adapters in the `BackendRegistry`.
pub struct MessageRouter {
    registry: Arc<BackendRegistry>,
    sessions: Arc<SessionStore>,
}

impl MessageRouter {
    pub fn new(registry: Arc<BackendRegistry>, sessions: Arc<SessionStore>) -> Self {
        Self { registry, sessions }
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Send `message` to the session's provider(s) and collect the results.
    ///
    /// Results come back in dispatch order whatever order the providers
    /// finish in. Only an unresolvable mode fails the call; provider
    /// problems show up as `BackendResult::Failure` entries.
    pub async fn route(&self, session: &SessionId, message: &str) -> Result<AggregatedResponse> {
        if message.trim().is_empty() {
            return Err(AppError::InvalidRequest("message text is empty".to_string()));
        }

        let mode = self.sessions.get_mode(session);
        let targets = self.resolve_targets(&mode)?;

        debug!(session = %session, mode = %mode, targets = targets.len(), "Dispatching message");
        let started = Instant::now();

        let results = match targets.as_slice() {
            [adapter] => vec![labeled(adapter.as_ref(), adapter.invoke(message).await)],
            _ => fan_out(&targets, message).await,
        };

        let succeeded = results.iter().filter(|r| r.result.is_success()).count();
        info!(
            session = %session,
            mode = %mode,
            succeeded,
            failed = results.len() - succeeded,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Message routed"
        );

        Ok(AggregatedResponse::new(mode, results))
    }

    /// Route a message, render the results and split them into fragments
    pub async fn respond(
        &self,
        session: &SessionId,
        message: &str,
        max_len: usize,
    ) -> Result<Reply> {
        let response = self.route(session, message).await?;
        let fragments = chunker::split(&response.render(), max_len);
        Ok(Reply {
            mode: response.mode,
            fragments,
        })
    }

    /// Validate and store a session's mode selection
    pub fn select_mode(&self, session: &SessionId, mode: RoutingMode) -> Result<RoutingMode> {
        if let RoutingMode::SingleBackend(id) = &mode {
            if !self.registry.contains(id) {
                warn!(session = %session, provider = %id, "Rejected unknown provider selection");
                return Err(AppError::Configuration(format!("Unknown provider '{}'", id)));
            }
        }

        self.sessions.set_mode(session, mode.clone());
        Ok(mode)
    }

    /// The session's current mode (the default if it never chose one)
    pub fn current_mode(&self, session: &SessionId) -> RoutingMode {
        self.sessions.get_mode(session)
    }

    /// Provider availability and the session's selection
    pub fn status(&self, session: &SessionId) -> StatusReport {
        let providers = self.registry.statuses();
        let all_operational = !providers.is_empty() && providers.iter().all(|p| p.available);

        StatusReport {
            providers,
            mode: self.sessions.get_mode(session),
            all_operational,
        }
    }

    /// Fragments to send when the transport reports a failed delivery
    pub fn delivery_failed(&self, session: &SessionId, max_len: usize) -> Vec<Fragment> {
        warn!(session = %session, "Transport reported a failed delivery");
        chunker::split(DELIVERY_FAILURE_MESSAGE, max_len)
    }

    /// Resolve every target adapter before anything is dispatched
    fn resolve_targets(&self, mode: &RoutingMode) -> Result<Vec<Arc<dyn BackendAdapter>>> {
        let ids: Vec<&str> = match mode {
            RoutingMode::SingleBackend(id) => vec![id.as_str()],
            RoutingMode::AllBackends => {
                self.registry.provider_ids().iter().map(String::as_str).collect()
            }
        };

        if ids.is_empty() {
            return Err(AppError::Configuration("No providers registered".to_string()));
        }

        ids.into_iter().map(|id| self.registry.adapter_for(id)).collect()
    }
}

/// Mode for sessions that never selected one.
///
/// The configured mode when given (it must name a registered provider),
/// otherwise the first provider with a credential, otherwise the first
/// registered provider, otherwise every provider.
pub fn default_mode(configured: Option<&str>, registry: &BackendRegistry) -> Result<RoutingMode> {
    if let Some(raw) = configured {
        let mode: RoutingMode = raw.parse()?;
        if let RoutingMode::SingleBackend(id) = &mode {
            registry.adapter_for(id)?;
        }
        return Ok(mode);
    }

    let mode = registry
        .available_providers()
        .into_iter()
        .next()
        .or_else(|| registry.provider_ids().first().cloned())
        .map(RoutingMode::SingleBackend)
        .unwrap_or(RoutingMode::AllBackends);

    Ok(mode)
}

/// Invoke every adapter concurrently and return results in input order.
///
/// Each call runs in its own task, so a slow, failing or panicking provider
/// cannot affect the others; a task that dies still yields a `Failure`.
async fn fan_out(targets: &[Arc<dyn BackendAdapter>], message: &str) -> Vec<LabeledResult> {
    let handles: Vec<JoinHandle<BackendResult>> = targets
        .iter()
        .map(|adapter| {
            let adapter = Arc::clone(adapter);
            let prompt = message.to_string();
            tokio::spawn(async move { adapter.invoke(&prompt).await })
        })
        .collect();

    let mut results = Vec::with_capacity(targets.len());
    for (adapter, handle) in targets.iter().zip(handles) {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!(provider = %adapter.id(), error = %e, "Provider task failed");
                BackendResult::failure(adapter.id(), format!("task failed: {}", e))
            }
        };
        results.push(labeled(adapter.as_ref(), result));
    }

    results
}

fn labeled(adapter: &dyn BackendAdapter, result: BackendResult) -> LabeledResult {
    LabeledResult {
        label: adapter.display_name().to_string(),
        result,
    }
}
