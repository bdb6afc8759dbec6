mod config;
mod errors;
mod jobs;
mod routes;
mod state;
mod store;
mod upstream;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StateBackend};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{FileStateStore, InMemoryStateStore, StateStore};
use crate::upstream::RemoteOkClient;

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

    info!("Starting JobBot API v{}", env!("CARGO_PKG_VERSION"));

    let source = RemoteOkClient::new(
        config.upstream_url.clone(),
        config.user_agent.clone(),
        config.upstream_timeout,
    )?;
    info!(
        "Upstream client initialized ({}, timeout {:?})",
        config.upstream_url, config.upstream_timeout
    );

    let store: Arc<dyn StateStore> = match &config.state_backend {
        StateBackend::File(path) => {
            let store = FileStateStore::new(path.clone());
            info!("Job state file: {}", store.path().display());
            Arc::new(store)
        }
        StateBackend::Memory => {
            info!("Job state kept in memory; it will not survive a restart");
            Arc::new(InMemoryStateStore::default())
        }
    };
    info!("Result selection mode: {:?}", config.selection);

    let state = AppState::new(config.clone(), Arc::new(source), store);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
