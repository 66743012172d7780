//! HTTP adapter for the estimation engine.
//!
//! | Route                         | Body                         | Response             |
//! |-------------------------------|------------------------------|----------------------|
//! | `GET /health`                 |                              | `{"status": "ok"}`   |
//! | `POST /simulate`              | [`EstimationRequest`]        | [`EstimationResult`] |
//! | `POST /simulate/monte-carlo`  | [`QuadraticMomentRequest`]   | [`QuickEstimate`]    |
//!
//! Parameters outside of the configured limits are answered with `422 Unprocessable Entity`, a
//! collapse of the importance weights with `500 Internal Server Error`. Both carry an
//! [`ErrorResponse`] body.
//!
//! [`EstimationRequest`]: crate::engine::EstimationRequest
//! [`EstimationResult`]: crate::engine::EstimationResult
//! [`QuadraticMomentRequest`]: crate::engine::QuadraticMomentRequest
//! [`QuickEstimate`]: crate::integrators::plain::QuickEstimate
//! [`ErrorResponse`]: routes::ErrorResponse

pub mod config;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

pub use config::ServerConfig;

/// Server instance that can be started
pub struct Server {
    config: Arc<ServerConfig>,
    router: Router,
}

impl Server {
    /// Create a new server instance with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let config = Arc::new(config);
        let router = routes::build_router(config.clone());

        Self { config, router }
    }

    /// Get the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds to the configured host and port and serves requests until the process ends.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        self.run_with_listener(listener).await
    }

    /// Serves requests on an already bound `listener`.
    pub async fn run_with_listener(self, listener: TcpListener) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "server listening");

        axum::serve(listener, self.router).await
    }
}
