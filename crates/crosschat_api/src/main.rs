use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crosschat_api::sources::Sources;
use crosschat_api::storage::MemoryStore;
use crosschat_api::{AppState, routes};

/// The crosschat crossword engine
#[derive(Debug, Parser)]
#[command(name = "crosschat-api")]
struct Args {
    /// Address to serve the HTTP API on
    #[arg(long, env = "CROSSCHAT_LISTEN", default_value = "0.0.0.0:5000")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Upstream date adapters are registered by the deployment; a bare
    // engine serves uploaded .puz files out of process memory
    let state = AppState::new(Arc::new(MemoryStore::new()), Sources::default());
    let router = routes::router(state);

    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    tracing::info!(listen = %args.listen, "serving");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for shutdown");
        return;
    }

    tracing::info!("shutting down");
}
