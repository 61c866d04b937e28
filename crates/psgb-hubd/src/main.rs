mod cli;
mod handlers;
mod logging;
mod router;

use anyhow::{Context, Result};
use clap::Parser;
use cli::CliArgs;
use psgb_hub_core::{Hub, HubSettings};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let settings = HubSettings::load(args.config.as_deref().map(std::path::Path::new)).context("loading configuration")?;

    let _logging_guard = logging::setup_tracing(&settings.logging).context("setting up logging")?;

    let listen_host = settings.listen_host.clone();
    let listen_port = settings.listen_port;

    let hub = Hub::spawn(settings).context("starting hub engine")?;
    let app = router::build(hub);

    let addr = format!("{listen_host}:{listen_port}");
    let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("binding {addr}"))?;
    tracing::info!(addr, "hub listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await.context("serving")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
