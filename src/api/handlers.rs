//! HTTP request handlers

use crate::api::models::{
    DeliveryFailureResponse, HealthResponse, ModeResponse, ProviderListResponse,
    SelectModeRequest, SendMessageRequest, SendMessageResponse,
};
use crate::error::AppError;
use crate::routing::StatusReport;
use crate::session::SessionId;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, Instrument};
use uuid::Uuid;

/// Route a chat message to the session's provider(s)
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let Json(request) = payload.map_err(rejected_body)?;
    let request_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("message", request_id = %request_id, session = %session_id);

    async move {
        info!(text_len = request.text.len(), "Received chat message");

        let session = SessionId::from(session_id.clone());
        let max_len = state.settings.chat.max_fragment_len;

        let reply = state
            .router
            .respond(&session, &request.text, max_len)
            .await?;

        info!(fragments = reply.fragments.len(), "Reply ready");

        Ok::<_, AppError>(Json(SendMessageResponse {
            mode: reply.mode,
            session_id,
            request_id,
            created: Utc::now().timestamp(),
            fragments: reply.fragments,
        }))
    }
    .instrument(span)
    .await
}

/// Current routing mode of a session
pub async fn get_mode(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Json<ModeResponse> {
    let mode = state.router.current_mode(&SessionId::from(session_id.clone()));
    Json(ModeResponse { session_id, mode })
}

/// Select the provider(s) a session talks to
pub async fn select_mode(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: Result<Json<SelectModeRequest>, JsonRejection>,
) -> Result<Json<ModeResponse>, AppError> {
    let Json(request) = payload.map_err(rejected_body)?;
    let mode = state
        .router
        .select_mode(&SessionId::from(session_id.clone()), request.mode)?;

    info!(session = %session_id, mode = %mode, "Routing mode selected");
    Ok(Json(ModeResponse { session_id, mode }))
}

/// Provider availability and the session's selection
pub async fn session_status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Json<StatusReport> {
    Json(state.router.status(&SessionId::from(session_id)))
}

/// Fallback reply for a delivery the transport could not complete
pub async fn delivery_failed(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Json<DeliveryFailureResponse> {
    let max_len = state.settings.chat.max_fragment_len;
    let fragments = state
        .router
        .delivery_failed(&SessionId::from(session_id.clone()), max_len);

    Json(DeliveryFailureResponse {
        session_id,
        fragments,
    })
}

/// List registered providers
pub async fn list_providers(State(state): State<Arc<AppState>>) -> Json<ProviderListResponse> {
    Json(ProviderListResponse {
        providers: state.router.registry().statuses(),
    })
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let registry = state.router.registry();
    let available = registry.available_providers().len();

    let status = if available == 0 {
        "unhealthy"
    } else if available < registry.len() {
        "degraded"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        providers: registry.len(),
        available,
        sessions: state.router.sessions().len(),
    })
}

fn rejected_body(rejection: JsonRejection) -> AppError {
    AppError::InvalidRequest(rejection.body_text())
}
