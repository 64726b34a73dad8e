use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use library_server::backend::{create_router, initialize_backend};
use library_server::config::LibraryConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = LibraryConfig::load()?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting library server");
    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state);

    let listener = TcpListener::bind(config.bind_address.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("Listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
