//! API request and response models

use serde::{Deserialize, Serialize};

use crate::backend::ProviderStatus;
use crate::routing::Fragment;
use crate::session::RoutingMode;

/// Inbound chat message
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendMessageRequest {
    /// Text the user typed
    pub text: String,
}

/// Reply to an inbound message, ready for in-order delivery
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendMessageResponse {
    pub session_id: String,
    pub request_id: String,
    pub mode: RoutingMode,
    /// Unix timestamp
    pub created: i64,
    pub fragments: Vec<Fragment>,
}

/// Mode selection event
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectModeRequest {
    /// A provider id, or `"all"`
    pub mode: RoutingMode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModeResponse {
    pub session_id: String,
    pub mode: RoutingMode,
}

/// Fallback reply after a failed delivery
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryFailureResponse {
    pub session_id: String,
    pub fragments: Vec<Fragment>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderListResponse {
    pub providers: Vec<ProviderStatus>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub providers: usize,
    pub available: usize,
    pub sessions: usize,
}
