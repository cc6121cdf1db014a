//! Configuration module

pub mod settings;

pub use settings::{
    default_providers, is_placeholder_credential, ChatConfig, LoggingConfig, ProviderAuth,
    ProviderConfig, ProviderKind, ServerConfig, Settings,
};
