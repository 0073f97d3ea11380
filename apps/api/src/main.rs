mod config;
mod errors;
mod ml;
mod models;
mod personality;
mod routes;
mod scoring;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::ml::{MlPipeline, PipelineConfig};
use crate::models::sector::SectorCatalog;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Persona API v{}", env!("CARGO_PKG_VERSION"));

    // Sector catalog: external file if configured, built-in otherwise
    let catalog = match &config.sector_catalog_path {
        Some(path) => SectorCatalog::load(path)?,
        None => SectorCatalog::builtin()?,
    };
    info!("Sector catalog loaded ({} sectors)", catalog.len());
    let catalog = Arc::new(catalog);

    // ML pipeline: loads the saved model and feedback if present
    let pipeline = MlPipeline::open(PipelineConfig::from(&config), catalog.clone())
        .context("Failed to open ML pipeline state")?;
    info!(
        "ML pipeline ready (enabled: {}, backend: {:?}, trained: {})",
        config.ml_enabled,
        config.ml_backend,
        pipeline.is_trained()
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        catalog,
        ml: Arc::new(RwLock::new(pipeline)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
