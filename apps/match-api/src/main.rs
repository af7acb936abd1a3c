//! Match API - REST server for batch uniclass semantic matching

use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_uniclass::{MatchService, OpenAIProvider, SupabaseMatchRepository};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        "Match backend at {}, embedding model {}",
        config.supabase.url,
        config.embedding_model.model_name()
    );

    let repository = SupabaseMatchRepository::new(config.supabase.clone())?;
    let embedder = Arc::new(OpenAIProvider::new(config.openai.clone()));

    let service = MatchService::new(repository, embedder)
        .with_model(config.embedding_model)
        .with_chunk_size(config.embedding_batch_size);

    // Build REST router
    let api_routes = api::routes(service);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;
    let app = router.merge(health_router(config.app));

    info!("Starting Match API on port {}", config.server.port);

    // Run server with graceful shutdown
    create_production_app(app, &config.server, Duration::from_secs(30), async {
        info!("Shutting down: no client connections to close");
    })
    .await?;

    info!("Match API shutdown complete");
    Ok(())
}
