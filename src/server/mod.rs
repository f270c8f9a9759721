pub mod form;
pub mod handlers;
pub mod response;

pub use form::AdRequestForm;
pub use response::{ApiError, CSV_FILENAME};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::llm::{AdCopyModel, AdGenerator, GeminiClient};
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use log::{error, info};
use std::sync::Arc;

pub fn router<M: AdCopyModel + 'static>(generator: AdGenerator<M>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(
            "/",
            post(handlers::generate_ads::<M>).options(handlers::preflight),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(Arc::new(generator))
}

pub fn gemini_generator(config: &ServerConfig) -> Result<AdGenerator<GeminiClient>> {
    let client = GeminiClient::new(config.gemini_api_key.clone())
        .with_model(config.gemini_model.clone())
        .with_base_url(config.gemini_base_url.clone());
    Ok(AdGenerator::new(client)?.with_guide_path(config.guide_path.clone()))
}

/// Serves the Gemini-backed endpoint until Ctrl-C.
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let generator = gemini_generator(config)?;
    info!(
        "Using model {} with guide {}",
        generator.model().model(),
        config.guide_path.display()
    );

    let app = router(generator, config.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Ad generation endpoint listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Could not listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutting down");
}
