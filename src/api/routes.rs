//! HTTP route definitions

use crate::api::handlers;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the main application router
pub fn create_router(state: Arc<crate::AppState>) -> Router {
    let api_routes = Router::new()
        .route("/sessions/:session_id/messages", post(handlers::send_message))
        .route(
            "/sessions/:session_id/mode",
            get(handlers::get_mode).put(handlers::select_mode),
        )
        .route("/sessions/:session_id/status", get(handlers::session_status))
        .route(
            "/sessions/:session_id/delivery-failures",
            post(handlers::delivery_failed),
        )
        .route("/providers", get(handlers::list_providers));

    Router::new()
        // Health check endpoint
        .route("/health", get(handlers::health_check))
        // API routes under /v1 prefix
        .nest("/v1", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
