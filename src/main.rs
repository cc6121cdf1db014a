//! Main entry point for the Chat Relay Gateway

use chat_relay_gateway::{api, config::Settings, logging, AppState};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Provider credentials usually come from a local .env file
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    logging::init(&settings.logging);

    info!("Starting Chat Relay Gateway");
    settings.validate()?;

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let app_state = Arc::new(AppState::from_settings(settings)?);

    {
        let registry = app_state.router.registry();
        for status in registry.statuses() {
            if status.available {
                info!(provider = %status.id, name = %status.display_name, "Provider configured");
            } else {
                warn!(provider = %status.id, name = %status.display_name, "Provider not configured");
            }
        }
        info!(
            default_mode = %app_state.router.sessions().default_mode(),
            "Registered {} providers ({} available)",
            registry.len(),
            registry.available_providers().len()
        );
    }

    let app = api::routes::create_router(app_state.clone());

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
