//! Plain Monte Carlo with independent samples.
use crate::callbacks::{Callback, SinkCallback};
use crate::config::EngineConfig;
use crate::convergence::{StreamingSummarizer, Summary};
use crate::core::estimators::*;
use crate::core::{Integrand, SquaredNorm};
use crate::engine::{Distribution, EstimationRequest, EstimationResult, Method};
use crate::error::Result;
use crate::rng::RandomSource;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Draws independent points from one of the fixed sampling distributions.
#[derive(Clone, Debug)]
pub struct StandardSampler {
    distribution: Distribution,
    dimensions: usize,
    mixture_std: f64,
}

impl StandardSampler {
    /// Creates a sampler for `dimensions`-dimensional points.
    pub fn new(distribution: Distribution, dimensions: usize, config: &EngineConfig) -> Self {
        Self {
            distribution,
            dimensions,
            mixture_std: config.mixture_std,
        }
    }

    /// The number of coordinates of each point.
    pub const fn dim(&self) -> usize {
        self.dimensions
    }

    /// Overwrites `x` with the next point.
    pub fn sample_into<R: Rng>(&self, rng: &mut RandomSource<R>, x: &mut [f64]) {
        debug_assert_eq!(x.len(), self.dimensions);

        match self.distribution {
            Distribution::Normal => rng.fill_normal(x, 0.0, 1.0),
            Distribution::Uniform => x.iter_mut().for_each(|v| *v = rng.uniform_range(-1.0, 1.0)),
            Distribution::Mixture => {
                // only the first two coordinates of the component centres are non-zero
                let centre = if rng.coin() { 1.0 } else { -1.0 };
                for (i, v) in x.iter_mut().enumerate() {
                    let mean = if i < 2 { centre } else { 0.0 };
                    *v = mean + self.mixture_std * rng.normal();
                }
            }
        }
    }
}

/// Integrates `integrand` with `calls` points drawn by `sampler`.
pub fn integrate<I, R, C>(
    integrand: &I,
    sampler: &StandardSampler,
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
    // reuse one buffer for all points
    let mut x = vec![0.0; sampler.dim()];
    let mut summarizer =
        StreamingSummarizer::<PlainEstimators<f64>, C>::new(calls, config, callback);

    for _ in 0..calls {
        sampler.sample_into(rng, &mut x);
        summarizer.push(integrand.call(&x))?;
    }

    summarizer.finish()
}

/// The standard Monte Carlo pipeline.
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

    let sampler = StandardSampler::new(request.distribution, request.dimensions, config);
    let summary = integrate(integrand, &sampler, request.samples, config, rng, callback)?;

    Ok(EstimationResult::from_summary(Method::Standard, summary))
}

/// The result of a single-shot estimate without convergence trace.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct QuickEstimate {
    /// The sample mean.
    pub estimate: f64,
    /// The standard error of the mean, zero for a single sample.
    pub std_error: f64,
    /// Number of samples drawn.
    pub samples_used: usize,
}

/// Estimates $E[\sum_i x_i^2] = d/3$ for $x$ uniform on $[0,1)^d$.
pub fn quadratic_moment<R: Rng>(
    calls: usize,
    dimensions: usize,
    rng: &mut RandomSource<R>,
) -> Result<QuickEstimate> {
    let config = EngineConfig {
        max_points: 1,
        ..EngineConfig::default()
    };
    let callback = SinkCallback {};
    let mut x = vec![0.0; dimensions];
    let mut summarizer =
        StreamingSummarizer::<PlainEstimators<f64>, _>::new(calls, &config, &callback);

    for _ in 0..calls {
        x.iter_mut().for_each(|v| *v = rng.uniform());
        summarizer.push(SquaredNorm.call(x.as_slice()))?;
    }

    let estimators = summarizer.estimators().clone();
    let summary = summarizer.finish()?;

    Ok(QuickEstimate {
        estimate: summary.estimate,
        std_error: estimators.std_error(),
        samples_used: summary.calls,
    })
}
