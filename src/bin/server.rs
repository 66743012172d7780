//! mcconverge server
//!
//! JSON API for Monte Carlo estimates with convergence traces.

use clap::Parser;
use mcconverge::server::{Server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();

    init_tracing(&config.log_level);

    tracing::info!("mcconverge server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        host = %config.host,
        port = %config.port,
        log_level = %config.log_level,
        cors_origins = ?config.cors_origins,
        max_dimensions = config.max_dimensions,
        max_samples = config.max_samples,
        "server configuration loaded"
    );

    Server::new(config).run().await?;

    Ok(())
}
