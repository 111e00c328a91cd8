mod config;
mod error;
mod handlers;
mod router;
mod state;

use clap::Parser;
use config::Args;
use router::create_router;
use state::AppState;
use std::sync::Arc;
use ticker_stats::StatisticsAggregator;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    tracing::info!(
        version = ticker_stats::SERVICE_VERSION,
        bind = %args.bind,
        rebuild_period_ms = args.rebuild_period_ms,
        "Starting ticker statistics gateway"
    );

    // Start the aggregation engine; its rebuild cycle runs immediately
    let aggregator = Arc::new(StatisticsAggregator::start(args.aggregator_config()));
    let state = AppState::new(Arc::clone(&aggregator));

    // Create router
    let app = create_router(state);

    // Bind and serve
    let listener = TcpListener::bind(args.bind).await?;

    tracing::info!("Listening on {}", args.bind);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and its state clone) is gone once serve returns
    match Arc::try_unwrap(aggregator) {
        Ok(aggregator) => aggregator.shutdown().await,
        Err(_) => tracing::warn!("Aggregator still shared at exit, aborting rebuild cycle"),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
