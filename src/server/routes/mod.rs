//! Route modules of the HTTP adapter
//!
//! - health: liveness check
//! - simulate: estimation endpoints

pub mod health;
pub mod simulate;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::task::JoinError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::config::ServerConfig;
use crate::config::{EngineConfig, Limits};
use crate::error::Error;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Constants of the estimation pipelines
    pub engine: Arc<EngineConfig>,
    /// Bounds checked before a request reaches the engine
    pub limits: Limits,
}

impl AppState {
    /// Create a new AppState
    pub fn new(config: Arc<ServerConfig>) -> Self {
        let limits = config.limits();

        Self {
            config,
            engine: Arc::new(EngineConfig::default()),
            limits,
        }
    }
}

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error kind
    pub error: String,
    /// Human-readable description
    pub message: String,
}

/// Failure of a handler
#[derive(Debug)]
pub enum ApiError {
    /// The engine rejected the request or failed while running it
    Engine(Error),
    /// The request body is not a valid request
    Body(JsonRejection),
    /// The blocking worker panicked or was cancelled
    Worker(JoinError),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Engine(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        Self::Worker(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            Self::Engine(err @ Error::InvalidParameter { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_parameter", err.to_string())
            }
            Self::Engine(err @ Error::DegenerateWeights { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "degenerate_weights", err.to_string())
            }
            Self::Body(rejection) => (rejection.status(), "invalid_body", rejection.body_text()),
            Self::Worker(err) => {
                tracing::error!(error = %err, "estimation worker failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", err.to_string())
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the main application router by merging all route modules
pub fn build_router(config: Arc<ServerConfig>) -> Router {
    let cors = cors_layer(&config.cors_origins);
    let state = AppState::new(config);

    Router::new()
        .merge(health::routes())
        .merge(simulate::routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
