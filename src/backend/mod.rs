//! Backend module - provider adapters and registry

pub mod client;
pub mod gemini;
pub mod openai;
pub mod registry;
pub mod traits;

pub use gemini::GeminiBackend;
pub use openai::OpenAICompatibleBackend;
pub use registry::{create_adapter, BackendRegistry};
pub use traits::{BackendAdapter, BackendResult, ProviderStatus, EMPTY_PROMPT, NOT_CONFIGURED};
