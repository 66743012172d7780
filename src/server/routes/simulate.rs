//! Estimation endpoints
//!
//! Both endpoints validate the request against the configured limits and then run the engine on
//! the blocking thread pool, so that long estimations do not stall the async runtime.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::post,
    Router,
};

use super::{ApiError, AppState};
use crate::callbacks::TracingCallback;
use crate::engine::{simulate_with, EstimationRequest, EstimationResult, QuadraticMomentRequest};
use crate::integrators::plain::{quadratic_moment, QuickEstimate};
use crate::rng::RandomSource;

/// Build the estimation routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/simulate", post(simulate_handler))
        .route("/simulate/monte-carlo", post(monte_carlo_handler))
}

/// POST /simulate - Estimation with convergence trace
async fn simulate_handler(
    State(state): State<AppState>,
    payload: Result<Json<EstimationRequest>, JsonRejection>,
) -> Result<Json<EstimationResult>, ApiError> {
    let Json(request) = payload?;
    request.validate(&state.limits)?;

    let engine = state.engine.clone();
    let result =
        tokio::task::spawn_blocking(move || simulate_with(&request, &engine, &TracingCallback {}))
            .await??;

    tracing::info!(
        method = %result.method,
        samples = result.samples_used,
        estimate = result.estimate,
        "estimation finished"
    );

    Ok(Json(result))
}

/// POST /simulate/monte-carlo - Single-shot estimate of the quadratic moment
async fn monte_carlo_handler(
    State(state): State<AppState>,
    payload: Result<Json<QuadraticMomentRequest>, JsonRejection>,
) -> Result<Json<QuickEstimate>, ApiError> {
    let Json(request) = payload?;
    request.validate(&state.limits)?;

    let estimate = tokio::task::spawn_blocking(move || {
        let mut rng = RandomSource::new(request.seed);
        quadratic_moment(request.samples, request.dimensions, &mut rng)
    })
    .await??;

    Ok(Json(estimate))
}
