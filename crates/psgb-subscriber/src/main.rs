mod cli;
mod handlers;
mod router;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use cli::CliArgs;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::new("info")).init();

    let state = AppState::new(args.hub_url, args.self_url);
    let app = router::build(state);

    let listener = tokio::net::TcpListener::bind(&args.listen).await.with_context(|| format!("binding {}", args.listen))?;
    tracing::info!(addr = %args.listen, "subscriber agent listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await.context("serving")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
