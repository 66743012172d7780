//! Tunable constants of the estimation pipelines and the request bounds enforced at the boundary.

use serde::{Deserialize, Serialize};

/// Constants used by the estimation pipelines.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of down-sampled convergence points, not counting the final one.
    pub max_points: usize,
    /// Largest lag of the chain autocorrelation.
    pub max_lag: usize,
    /// Number of most recent chain values reported as the trace.
    pub trace_len: usize,
    /// Quantile of the standard normal used for the confidence interval.
    pub z_score: f64,
    /// Standard deviation of the random-walk proposal of the Metropolis chain.
    pub chain_step_size: f64,
    /// Per-coordinate variance of the importance sampling proposal.
    pub proposal_variance: f64,
    /// Per-coordinate standard deviation of each mixture component.
    pub mixture_std: f64,
    /// How often the initial chain state is redrawn before falling back to the origin.
    pub max_init_attempts: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_points: 200,
            max_lag: 40,
            trace_len: 1000,
            z_score: 1.96,
            chain_step_size: 0.8,
            proposal_variance: 4.0,
            mixture_std: 0.6,
            max_init_attempts: 10_000,
        }
    }
}

/// Inclusive bounds on request parameters.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Limits {
    /// Largest number of dimensions.
    pub max_dimensions: usize,
    /// Smallest sample count of the convergence endpoint.
    pub min_samples: usize,
    /// Largest sample count of the convergence endpoint.
    pub max_samples: usize,
    /// Smallest sample count of the single-shot endpoint.
    pub min_single_shot_samples: usize,
    /// Largest sample count of the single-shot endpoint.
    pub max_single_shot_samples: usize,
    /// Upper bound of the shape parameters; the lower bound is exclusive zero.
    pub max_shape: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_dimensions: 20,
            min_samples: 100,
            max_samples: 200_000,
            min_single_shot_samples: 1,
            max_single_shot_samples: 1_000_000,
            max_shape: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"max_points": 50}"#).unwrap();

        assert_eq!(config.max_points, 50);
        assert_eq!(config.max_lag, 40);
        assert_eq!(config.trace_len, 1000);
    }

    #[test]
    fn default_limits() {
        let limits = Limits::default();

        assert_eq!(limits.max_dimensions, 20);
        assert_eq!((limits.min_samples, limits.max_samples), (100, 200_000));
        assert_eq!(limits.max_shape, 10.0);
    }
}
