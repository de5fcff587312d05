mod config;
mod errors;
mod generation;
mod knobs;
mod llm_client;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cognitive Knobs API v{}", env!("CARGO_PKG_VERSION"));

    // The API key is checked per call so the knob editor still works without one
    if config.openrouter_api_key.is_none() {
        warn!("OPENROUTER_API_KEY is not set; generation requests will fail with 401");
    }

    let llm = LlmClient::new(&config)?;
    info!(
        "LLM client initialized (model: {}, provider: {})",
        llm_client::MODEL,
        llm_client::PROVIDER
    );

    // Persistence is best-effort: an unusable state directory downgrades to memory
    let storage: Arc<dyn KeyValueStore> = match FileStore::open(&config.state_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(
                "Cannot use state directory {}: {e}; knob state will not survive restarts",
                config.state_dir.display()
            );
            Arc::new(MemoryStore::default())
        }
    };

    let state = AppState::new(llm, storage);

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
