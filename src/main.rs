use std::sync::Arc;

use financial_projection_api::api;
use financial_projection_api::config::Settings;
use financial_projection_api::engine::ProjectionEngine;
use financial_projection_api::llm::GeminiClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let settings = Settings::from_env();
    let api_key = settings
        .gemini_api_key
        .clone()
        .ok_or("GEMINI_API_KEY must be set")?;

    // The client is constructed once and shared across requests; it is
    // stateless from the caller's perspective.
    let client = GeminiClient::new(api_key, settings.gemini_model.clone());
    let engine = Arc::new(ProjectionEngine::new(Arc::new(client)));
    let app = api::router(engine);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));
    log::info!(
        "Financial Projection API listening on {addr} (model: {})",
        settings.gemini_model
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
