//! Backend registry holding the provider adapters declared at startup

use dashmap::DashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::gemini::GeminiBackend;
use crate::backend::openai::OpenAICompatibleBackend;
use crate::backend::traits::{BackendAdapter, ProviderStatus};
use crate::config::{ProviderConfig, ProviderKind};
use crate::error::{AppError, Result};

/// Registry of provider adapters.
///
/// Filled once at startup and read-only afterwards. `order` keeps the
/// canonical (declaration) order used when fanning out to every provider.
pub struct BackendRegistry {
    backends: DashMap<String, Arc<dyn BackendAdapter>>,
    order: Vec<String>,
}

impl BackendRegistry {
    /// Build a registry from provider declarations.
    ///
    /// Disabled providers are skipped, adapters that cannot be built are
    /// logged and skipped, and duplicate ids are rejected.
    pub fn from_config(configs: &[ProviderConfig]) -> Result<Self> {
        let mut adapters: Vec<Arc<dyn BackendAdapter>> = Vec::new();

        for config in configs {
            if !config.enabled {
                info!(provider = %config.id, "Skipping disabled provider");
                continue;
            }

            match create_adapter(config) {
                Ok(adapter) => {
                    info!(
                        provider = %config.id,
                        kind = %config.kind,
                        available = adapter.is_available(),
                        "Registered provider"
                    );
                    adapters.push(adapter);
                }
                Err(e) => {
                    warn!(provider = %config.id, error = %e, "Failed to create provider adapter");
                }
            }
        }

        Self::from_adapters(adapters)
    }

    /// Build a registry from ready-made adapters, keeping their order
    pub fn from_adapters(adapters: Vec<Arc<dyn BackendAdapter>>) -> Result<Self> {
        let backends = DashMap::new();
        let mut order = Vec::with_capacity(adapters.len());

        for adapter in adapters {
            let id = adapter.id().to_string();
            if backends.contains_key(&id) {
                return Err(AppError::Configuration(format!(
                    "Provider '{}' is declared more than once",
                    id
                )));
            }
            backends.insert(id.clone(), adapter);
            order.push(id);
        }

        Ok(Self { backends, order })
    }

    /// Adapter for a provider id
    pub fn adapter_for(&self, id: &str) -> Result<Arc<dyn BackendAdapter>> {
        self.backends
            .get(id)
            .map(|r| r.value().clone())
            .ok_or_else(|| AppError::Configuration(format!("Unknown provider '{}'", id)))
    }

    /// Every registered provider id, in canonical order
    pub fn provider_ids(&self) -> &[String] {
        &self.order
    }

    /// Ids of providers with a usable credential, in canonical order
    pub fn available_providers(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| {
                self.backends
                    .get(id.as_str())
                    .map_or(false, |b| b.value().is_available())
            })
            .cloned()
            .collect()
    }

    /// Status of every provider, in canonical order
    pub fn statuses(&self) -> Vec<ProviderStatus> {
        self.order
            .iter()
            .filter_map(|id| self.backends.get(id.as_str()).map(|b| b.value().status()))
            .collect()
    }

    /// Check if a provider exists
    pub fn contains(&self, id: &str) -> bool {
        self.backends.contains_key(id)
    }

    /// Get the number of registered providers
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Create the adapter matching a provider's protocol
pub fn create_adapter(config: &ProviderConfig) -> Result<Arc<dyn BackendAdapter>> {
    match config.kind {
        ProviderKind::OpenAI => Ok(Arc::new(OpenAICompatibleBackend::new(config)?)),
        ProviderKind::Gemini => Ok(Arc::new(GeminiBackend::new(config)?)),
    }
}
