//! Chat Relay Gateway
//!
//! Routes chat messages to one or many hosted LLM providers per session,
//! aggregates their answers in a stable order and splits the reply into
//! transport-sized fragments.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod routing;
pub mod session;

pub use error::{AppError, Result};

use std::sync::Arc;

use backend::BackendRegistry;
use routing::MessageRouter;
use session::SessionStore;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub router: Arc<MessageRouter>,
}

impl AppState {
    /// Build the registry, session store and router described by `settings`
    pub fn from_settings(settings: config::Settings) -> Result<Self> {
        let registry = Arc::new(BackendRegistry::from_config(&settings.providers)?);
        Self::with_registry(settings, registry)
    }

    /// Build state around an existing registry
    pub fn with_registry(settings: config::Settings, registry: Arc<BackendRegistry>) -> Result<Self> {
        let default_mode = routing::default_mode(settings.chat.default_mode.as_deref(), &registry)?;
        let sessions = Arc::new(SessionStore::new(default_mode));

        Ok(Self {
            settings: Arc::new(settings),
            router: Arc::new(MessageRouter::new(registry, sessions)),
        })
    }
}
