use edge_functions::{build_router, config::Config, logger, state::AppState};
use std::{net::SocketAddr, path::Path, sync::Arc};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path =
        std::env::var("EDGE_FUNCTIONS_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config_found = Path::new(&config_path).exists();
    let cfg = if config_found {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };

    logger::init(cfg.log_level.as_deref());
    if !config_found {
        warn!(path = %config_path, "Config file not found, using defaults");
    }

    let state = Arc::new(AppState::from_config(&cfg)?);
    let app = build_router(state);

    let addr: SocketAddr = cfg.listen_addr().parse()?;
    info!(%addr, "Starting edge-functions");

    let server = axum::Server::bind(&addr).serve(app.into_make_service());

    let graceful = server.with_graceful_shutdown(shutdown_signal());
    graceful.await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("Shutdown signal received");
}
