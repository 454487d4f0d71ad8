mod routes;
mod state;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use maintcal_core::MemoryStore;
use maintcal_core::config::{MaintCalConfig, SeedData};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = MaintCalConfig::load()?;
    let store = load_store(&config)?;
    let state = AppState::new(store, &config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state).layer(cors);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind_address '{}'", config.bind_address))?;
    info!(%addr, "maintcal-server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Seed the in-memory store once at startup.
fn load_store(config: &MaintCalConfig) -> Result<MemoryStore> {
    let seed = match config.seed_path() {
        Some(path) => {
            info!(path = %path.display(), "loading seed data");
            SeedData::load(&path)
                .with_context(|| format!("Failed to load seed file {}", path.display()))?
        }
        None => SeedData::default(),
    };

    let store = MemoryStore::from_seed(&seed)?;
    info!(
        locations = seed.locations_or_default().len(),
        assets = seed.assets.len(),
        pm_schedules = seed.pm_schedules.len(),
        "store ready"
    );

    Ok(store)
}
