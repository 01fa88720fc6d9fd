use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::{init_logging_default, init_logging_json};
use configs::{AppConfig, LogFormat, StoreConfig};
use service::car::{seed, CarRepository, CarService, InMemoryCarRepository};
use tracing::info;

use crate::errors::StartupError;
use crate::routes;

/// Shared handler state. Cloning is cheap; the service sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub cars: Arc<CarService<InMemoryCarRepository>>,
}

impl AppState {
    pub fn new(repo: InMemoryCarRepository) -> Self {
        Self { cars: Arc::new(CarService::new(Arc::new(repo))) }
    }

    /// State for the configured store: seeded with the demo cars or empty.
    pub fn from_config(store: &StoreConfig) -> Self {
        let repo = if store.seed {
            InMemoryCarRepository::with_cars(seed::demo_cars())
        } else {
            InMemoryCarRepository::new()
        };
        Self::new(repo)
    }
}

/// Initialize logging in the configured format
pub fn init_logging(format: LogFormat) {
    match format {
        LogFormat::Compact => init_logging_default(),
        LogFormat::Json => init_logging_json(),
    }
}

/// Application router for the given state.
pub fn build_app(state: AppState) -> Router {
    routes::build_router(state)
}

fn parse_bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let addr = cfg.server.bind_addr();
    addr.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address {addr:?}: {e}")))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, shutting down");
    }
}

/// Run the HTTP server with an already-loaded config until Ctrl+C.
pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&cfg.store);
    let seeded = state.cars.repository().count().await;
    let app = build_app(state);

    let addr = parse_bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.to_string(), source })?;
    info!(%addr, cars = seeded, "starting cars server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}
