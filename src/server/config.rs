//! Server configuration, read from command-line arguments with environment-variable fallbacks.

use clap::Parser;

use crate::config::Limits;

/// Configuration of the HTTP server.
#[derive(Clone, Debug, Parser, PartialEq)]
#[command(name = "mcconverge-server")]
#[command(version, about = "HTTP API for Monte Carlo estimates with convergence traces")]
pub struct ServerConfig {
    /// Host address to bind to
    #[arg(long, env = "MCCONVERGE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "MCCONVERGE_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Log filter used when `RUST_LOG` is not set (trace, debug, info, warn, error)
    #[arg(long, env = "MCCONVERGE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Origins allowed to make cross-origin requests, comma-separated
    #[arg(
        long = "cors-origin",
        env = "MCCONVERGE_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173"
    )]
    pub cors_origins: Vec<String>,

    /// Largest number of dimensions a request may ask for
    #[arg(long, env = "MCCONVERGE_MAX_DIMENSIONS", default_value_t = 20)]
    pub max_dimensions: usize,

    /// Largest sample count of `/simulate`
    #[arg(long, env = "MCCONVERGE_MAX_SAMPLES", default_value_t = 200_000)]
    pub max_samples: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let limits = Limits::default();

        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            max_dimensions: limits.max_dimensions,
            max_samples: limits.max_samples,
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The request bounds enforced by the handlers.
    pub fn limits(&self) -> Limits {
        Limits {
            max_dimensions: self.max_dimensions,
            max_samples: self.max_samples,
            ..Limits::default()
        }
    }
}
