//! Importance sampling of a standard normal target from a widened normal proposal.
//!
//! Points are drawn from $q = \mathcal{N}(0, \sigma_q^2 I)$ and weighted with
//! $w(x) = p(x) / q(x)$ where $p = \mathcal{N}(0, I)$ is the target. The estimate is the
//! self-normalised mean $\sum w f / \sum w$.
use std::f64::consts::PI;

use crate::callbacks::Callback;
use crate::config::EngineConfig;
use crate::convergence::{StreamingSummarizer, Summary};
use crate::core::estimators::WeightedEstimators;
use crate::core::{squared_norm, Integrand};
use crate::engine::{Distribution, EstimationRequest, EstimationResult, Method};
use crate::error::Result;
use crate::rng::RandomSource;

use rand::Rng;

/// Log-density of the isotropic normal $\mathcal{N}(0, \sigma^2 I)$ at `x`.
pub fn log_normal_density(x: &[f64], variance: f64) -> f64 {
    let dims = x.len() as f64;
    -0.5 * (squared_norm(x) / variance + dims * (2.0 * PI * variance).ln())
}

/// Draws points from the proposal together with their importance weights.
#[derive(Clone, Debug)]
pub struct ImportanceSampler {
    dimensions: usize,
    proposal_variance: f64,
}

impl ImportanceSampler {
    /// Creates a sampler with the proposal variance of `config`.
    pub fn new(dimensions: usize, config: &EngineConfig) -> Self {
        Self {
            dimensions,
            proposal_variance: config.proposal_variance,
        }
    }

    /// The number of coordinates of each point.
    pub const fn dim(&self) -> usize {
        self.dimensions
    }

    /// The importance weight of `x`.
    pub fn weight(&self, x: &[f64]) -> f64 {
        (log_normal_density(x, 1.0) - log_normal_density(x, self.proposal_variance)).exp()
    }

    /// Overwrites `x` with the next proposal point and returns its weight.
    pub fn sample_into<R: Rng>(&self, rng: &mut RandomSource<R>, x: &mut [f64]) -> f64 {
        debug_assert_eq!(x.len(), self.dimensions);
        rng.fill_normal(x, 0.0, self.proposal_variance.sqrt());
        self.weight(x)
    }
}

/// Importance sampling always targets the standard normal, so any other requested distribution
/// is replaced by [`Distribution::Normal`] before the pipeline runs.
pub fn normalize_request(request: &EstimationRequest) -> EstimationRequest {
    if request.distribution != Distribution::Normal {
        tracing::debug!(
            requested = ?request.distribution,
            "importance sampling targets the normal distribution"
        );
    }

    EstimationRequest {
        distribution: Distribution::Normal,
        ..request.clone()
    }
}

/// Integrates `integrand` with `calls` weighted points drawn by `sampler`.
pub fn integrate<I, R, C>(
    integrand: &I,
    sampler: &ImportanceSampler,
    calls: usize,
    config: &EngineConfig,
    rng: &mut RandomSource<R>,
    callback: &C,
) -> Result<Summary>
where
    I: Integrand<f64>,
    R: Rng,
    C: Callback + ?Sized,
{
    let mut x = vec![0.0; sampler.dim()];
    let mut summarizer =
        StreamingSummarizer::<WeightedEstimators<f64>, C>::new(calls, config, callback);

    for _ in 0..calls {
        let weight = sampler.sample_into(rng, &mut x);
        summarizer.push((integrand.call(&x), weight))?;
    }

    summarizer.finish()
}

/// The importance sampling pipeline.
pub fn run<I, R, C>(
    request: &EstimationRequest,
    config: &EngineConfig,
    rng: &mut RandomSource<R>,
    integrand: &I,
    callback: &C,
) -> Result<EstimationResult>
where
    I: Integrand<f64>,
    R: Rng,
    C: Callback + ?Sized,
{
    request.check_invariants()?;

    let request = normalize_request(request);
    let sampler = ImportanceSampler::new(request.dimensions, config);
    let summary = integrate(integrand, &sampler, request.samples, config, rng, callback)?;

    Ok(EstimationResult::from_summary(Method::Importance, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::SinkCallback;
    use crate::core::GaussianKernel;
    use crate::error::Error;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn log_density_of_standard_normal() {
        assert_approx_eq!(
            log_normal_density(&[0.0], 1.0),
            -0.5 * (2.0 * PI).ln(),
            1e-15
        );
        assert_approx_eq!(
            log_normal_density(&[1.0, -1.0], 4.0),
            -0.5 * (0.5 + 2.0 * (8.0 * PI).ln()),
            1e-14
        );
    }

    #[test]
    fn weight_closed_form() {
        // p/q = 2^d exp(-3|x|^2/8) for a proposal variance of four
        let sampler = ImportanceSampler::new(2, &EngineConfig::default());

        assert_approx_eq!(sampler.weight(&[0.0, 0.0]), 4.0, 1e-12);
        assert_approx_eq!(sampler.weight(&[1.0, 1.0]), 4.0 * (-0.75f64).exp(), 1e-12);
    }

    #[test]
    fn weights_average_to_one() {
        let sampler = ImportanceSampler::new(3, &EngineConfig::default());
        let mut rng = RandomSource::seeded(21);
        let mut x = vec![0.0; 3];
        let n = 50_000;
        let total: f64 = (0..n).map(|_| sampler.sample_into(&mut rng, &mut x)).sum();

        assert_approx_eq!(total / n as f64, 1.0, 0.05);
    }

    #[test]
    fn normalization_forces_normal() {
        let request = EstimationRequest {
            method: Method::Importance,
            distribution: Distribution::Uniform,
            dimensions: 4,
            ..EstimationRequest::default()
        };
        let normalized = normalize_request(&request);

        assert_eq!(normalized.distribution, Distribution::Normal);
        assert_eq!(normalized.dimensions, 4);
        assert_eq!(normalized.method, Method::Importance);
    }

    #[test]
    fn requested_distribution_does_not_matter() {
        let config = EngineConfig::default();
        let run_with = |distribution| {
            let request = EstimationRequest {
                method: Method::Importance,
                distribution,
                samples: 2_000,
                seed: Some(3),
                ..EstimationRequest::default()
            };
            run(
                &request,
                &config,
                &mut RandomSource::seeded(3),
                &GaussianKernel,
                &SinkCallback {},
            )
            .unwrap()
        };

        assert_eq!(run_with(Distribution::Normal), run_with(Distribution::Mixture));
    }

    #[test]
    fn collapsed_weights_fail() {
        // proposal points land so far out that every target density underflows
        let sampler = ImportanceSampler {
            dimensions: 1,
            proposal_variance: 1e300,
        };
        let mut rng = RandomSource::seeded(0);
        let result = integrate(
            &GaussianKernel,
            &sampler,
            10,
            &EngineConfig::default(),
            &mut rng,
            &SinkCallback {},
        );

        assert!(matches!(result, Err(Error::DegenerateWeights { .. })));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let request = EstimationRequest {
            method: Method::Importance,
            dimensions: 0,
            ..EstimationRequest::default()
        };
        let result = run(
            &request,
            &EngineConfig::default(),
            &mut RandomSource::seeded(0),
            &GaussianKernel,
            &SinkCallback {},
        );

        assert!(matches!(
            result,
            Err(Error::InvalidParameter {
                name: "dimensions",
                ..
            })
        ));
    }
}
