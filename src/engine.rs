//! Request and result types, and the single dispatch site that maps a [`Method`] onto its
//! pipeline.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::callbacks::{Callback, TracingCallback};
use crate::config::{EngineConfig, Limits};
use crate::convergence::{ConvergenceTrace, Summary};
use crate::core::GaussianKernel;
use crate::error::{Error, Result};
use crate::integrators::{importance, metropolis, plain};
use crate::rng::RandomSource;

/// The sampling method of an estimation.
///
/// Method identifiers are parsed leniently: any identifier that is not recognised selects
/// [`Method::Standard`] instead of failing the request.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Hash, Serialize)]
#[serde(from = "String", rename_all = "kebab-case")]
pub enum Method {
    /// Plain Monte Carlo with independent samples.
    #[default]
    Standard,
    /// Self-normalised importance sampling from a widened normal proposal.
    Importance,
    /// Random-walk Metropolis–Hastings.
    MetropolisHastings,
}

impl Method {
    /// The identifier of this method.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Importance => "importance",
            Self::MetropolisHastings => "metropolis-hastings",
        }
    }
}

impl From<&str> for Method {
    fn from(identifier: &str) -> Self {
        match identifier {
            "standard" => Self::Standard,
            "importance" => Self::Importance,
            "metropolis-hastings" => Self::MetropolisHastings,
            unknown => {
                tracing::debug!(method = unknown, "unknown method, using standard");
                Self::Standard
            }
        }
    }
}

impl From<String> for Method {
    fn from(identifier: String) -> Self {
        Self::from(identifier.as_str())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The sampling distribution of the standard method, and the target of the chain.
///
/// Like [`Method`], identifiers are parsed leniently: anything other than `normal` or `uniform`
/// selects [`Distribution::Mixture`], which the chain in turn treats as a normal target.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Hash, Serialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum Distribution {
    /// Standard multivariate normal.
    #[default]
    Normal,
    /// Uniform on the box $[-1, 1]^d$.
    Uniform,
    /// Equal-weight mixture of two isotropic normals centred at $\pm(1, 1, 0, \ldots, 0)$.
    Mixture,
}

impl Distribution {
    /// The identifier of this distribution.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Uniform => "uniform",
            Self::Mixture => "mixture",
        }
    }
}

impl From<&str> for Distribution {
    fn from(identifier: &str) -> Self {
        match identifier {
            "normal" => Self::Normal,
            "uniform" => Self::Uniform,
            "mixture" | "custom" => Self::Mixture,
            unknown => {
                tracing::debug!(distribution = unknown, "unknown distribution, using mixture");
                Self::Mixture
            }
        }
    }
}

impl From<String> for Distribution {
    fn from(identifier: String) -> Self {
        Self::from(identifier.as_str())
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to run one estimation.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct EstimationRequest {
    /// The sampling method.
    pub method: Method,
    /// The sampling distribution, ignored by importance sampling.
    pub distribution: Distribution,
    /// Number of dimensions of each sample.
    pub dimensions: usize,
    /// Number of samples to draw.
    pub samples: usize,
    /// First shape parameter of a Beta proposal. Accepted and validated, but currently unused:
    /// every pipeline ignores it.
    pub alpha: f64,
    /// Second shape parameter of a Beta proposal. Accepted and validated, but currently unused.
    pub beta: f64,
    /// Seed of the random source; without a seed the run is not reproducible.
    pub seed: Option<u64>,
}

impl Default for EstimationRequest {
    fn default() -> Self {
        Self {
            method: Method::Standard,
            distribution: Distribution::Normal,
            dimensions: 2,
            samples: 1000,
            alpha: 2.0,
            beta: 2.0,
            seed: None,
        }
    }
}

impl EstimationRequest {
    /// Checks every parameter against `limits`. This is the validation performed at the boundary
    /// before a request reaches the engine.
    pub fn validate(&self, limits: &Limits) -> Result<()> {
        check_range("dimensions", self.dimensions, 1, limits.max_dimensions)?;
        check_range("samples", self.samples, limits.min_samples, limits.max_samples)?;
        check_shape("alpha", self.alpha, limits.max_shape)?;
        check_shape("beta", self.beta, limits.max_shape)
    }

    pub(crate) fn check_invariants(&self) -> Result<()> {
        if self.dimensions == 0 {
            return Err(Error::invalid("dimensions", "must be at least 1"));
        }
        if self.samples == 0 {
            return Err(Error::invalid("samples", "must be at least 1"));
        }
        Ok(())
    }
}

fn check_range(name: &'static str, value: usize, min: usize, max: usize) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid(
            name,
            format!("{value} is outside of [{min}, {max}]"),
        ))
    }
}

fn check_shape(name: &'static str, value: f64, max: f64) -> Result<()> {
    if value > 0.0 && value <= max {
        Ok(())
    } else {
        Err(Error::invalid(name, format!("{value} is outside of (0, {max}]")))
    }
}

/// The outcome of one estimation.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EstimationResult {
    /// The method that actually ran.
    pub method: Method,
    /// Final running mean.
    pub estimate: f64,
    /// Final running variance.
    pub variance: f64,
    /// Lower bound of the final confidence interval.
    pub ci_low: f64,
    /// Upper bound of the final confidence interval.
    pub ci_high: f64,
    /// Number of samples drawn.
    pub samples_used: usize,
    /// The down-sampled convergence series.
    #[serde(flatten)]
    pub convergence: ConvergenceTrace,
    /// Most recent values of the first chain coordinate, empty for independent samples.
    pub trace: Vec<f64>,
    /// Autocorrelation of `trace` for lags `0..=max_lag`, empty for independent samples.
    pub autocorrelation: Vec<f64>,
    /// Fraction of accepted chain proposals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_rate: Option<f64>,
}

impl EstimationResult {
    pub(crate) fn from_summary(method: Method, summary: Summary) -> Self {
        Self {
            method,
            estimate: summary.estimate,
            variance: summary.variance,
            ci_low: summary.ci_low,
            ci_high: summary.ci_high,
            samples_used: summary.calls,
            convergence: summary.convergence,
            trace: Vec::new(),
            autocorrelation: Vec::new(),
            acceptance_rate: None,
        }
    }

    /// Half the width of the final confidence interval divided by the z-score, i.e. the standard
    /// error of the estimate.
    pub fn std_error(&self, z_score: f64) -> f64 {
        (self.ci_high - self.ci_low) / (2.0 * z_score)
    }
}

/// Runs `request` with the default configuration, reporting convergence points as `TRACE`
/// events.
pub fn simulate(request: &EstimationRequest) -> Result<EstimationResult> {
    simulate_with(request, &EngineConfig::default(), &TracingCallback {})
}

/// Runs `request` with an explicit configuration and callback, drawing from a source seeded by
/// the request.
pub fn simulate_with<C>(
    request: &EstimationRequest,
    config: &EngineConfig,
    callback: &C,
) -> Result<EstimationResult>
where
    C: Callback + ?Sized,
{
    let mut rng = RandomSource::new(request.seed);
    simulate_with_rng(request, config, &mut rng, callback)
}

/// Runs `request` drawing from `rng`.
pub fn simulate_with_rng<R, C>(
    request: &EstimationRequest,
    config: &EngineConfig,
    rng: &mut RandomSource<R>,
    callback: &C,
) -> Result<EstimationResult>
where
    R: Rng,
    C: Callback + ?Sized,
{
    request.check_invariants()?;

    tracing::debug!(
        method = %request.method,
        distribution = ?request.distribution,
        dimensions = request.dimensions,
        samples = request.samples,
        seeded = request.seed.is_some(),
        "starting estimation"
    );

    let integrand = GaussianKernel;

    match request.method {
        Method::Standard => plain::run(request, config, rng, &integrand, callback),
        Method::Importance => importance::run(request, config, rng, &integrand, callback),
        Method::MetropolisHastings => metropolis::run(request, config, rng, &integrand, callback),
    }
}

/// A request for the single-shot estimate of $E[\sum_i x_i^2]$ with $x$ uniform on $[0,1)^d$.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct QuadraticMomentRequest {
    /// Number of samples to draw.
    pub samples: usize,
    /// Number of dimensions of each sample.
    pub dimensions: usize,
    /// Seed of the random source.
    pub seed: Option<u64>,
}

impl Default for QuadraticMomentRequest {
    fn default() -> Self {
        Self {
            samples: 1000,
            dimensions: 2,
            seed: None,
        }
    }
}

impl QuadraticMomentRequest {
    /// Checks every parameter against `limits`.
    pub fn validate(&self, limits: &Limits) -> Result<()> {
        check_range("dimensions", self.dimensions, 1, limits.max_dimensions)?;
        check_range(
            "samples",
            self.samples,
            limits.min_single_shot_samples,
            limits.max_single_shot_samples,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::SinkCallback;

    fn request(method: Method, distribution: Distribution) -> EstimationRequest {
        EstimationRequest {
            method,
            distribution,
            dimensions: 2,
            samples: 500,
            seed: Some(11),
            ..EstimationRequest::default()
        }
    }

    #[test]
    fn method_identifiers() {
        assert_eq!(Method::from("standard"), Method::Standard);
        assert_eq!(Method::from("importance"), Method::Importance);
        assert_eq!(Method::from("metropolis-hastings"), Method::MetropolisHastings);
        assert_eq!(Method::from("unknown-xyz"), Method::Standard);
        assert_eq!(Method::from(""), Method::Standard);
        assert_eq!(Method::MetropolisHastings.to_string(), "metropolis-hastings");
    }

    #[test]
    fn method_serde() {
        assert_eq!(
            serde_json::to_string(&Method::MetropolisHastings).unwrap(),
            r#""metropolis-hastings""#
        );
        let method: Method = serde_json::from_str(r#""gibbs""#).unwrap();
        assert_eq!(method, Method::Standard);
    }

    #[test]
    fn distribution_serde() {
        let custom: Distribution = serde_json::from_str(r#""custom""#).unwrap();
        let mixture: Distribution = serde_json::from_str(r#""mixture""#).unwrap();

        assert_eq!(custom, Distribution::Mixture);
        assert_eq!(mixture, Distribution::Mixture);
        assert_eq!(
            serde_json::to_string(&Distribution::Uniform).unwrap(),
            r#""uniform""#
        );
        assert_eq!(Distribution::Mixture.to_string(), "mixture");
    }

    #[test]
    fn unknown_distribution_falls_back_to_mixture() {
        let cauchy: Distribution = serde_json::from_str(r#""cauchy""#).unwrap();
        assert_eq!(cauchy, Distribution::Mixture);
        assert_eq!(Distribution::from("Normal"), Distribution::Mixture);

        let request: EstimationRequest = serde_json::from_str(
            r#"{"method": "standard", "distribution": "gaussian", "samples": 300, "seed": 6}"#,
        )
        .unwrap();
        assert_eq!(request.distribution, Distribution::Mixture);

        let config = EngineConfig::default();
        let fallback = simulate_with(&request, &config, &SinkCallback {}).unwrap();
        let mixture = simulate_with(
            &EstimationRequest {
                distribution: Distribution::Mixture,
                ..request.clone()
            },
            &config,
            &SinkCallback {},
        )
        .unwrap();
        assert_eq!(fallback, mixture);
    }

    #[test]
    fn shape_parameters_do_not_affect_results() {
        let config = EngineConfig::default();
        for method in [Method::Standard, Method::Importance, Method::MetropolisHastings] {
            let base = request(method, Distribution::Normal);
            let reshaped = EstimationRequest {
                alpha: 7.5,
                beta: 0.3,
                ..base.clone()
            };

            assert_eq!(
                simulate_with(&base, &config, &SinkCallback {}).unwrap(),
                simulate_with(&reshaped, &config, &SinkCallback {}).unwrap()
            );
        }
    }

    #[test]
    fn request_defaults_from_partial_json() {
        let request: EstimationRequest =
            serde_json::from_str(r#"{"method": "importance", "samples": 5000}"#).unwrap();

        assert_eq!(request.method, Method::Importance);
        assert_eq!(request.distribution, Distribution::Normal);
        assert_eq!(request.dimensions, 2);
        assert_eq!(request.samples, 5000);
        assert_eq!(request.seed, None);
    }

    #[test]
    fn validation_bounds() {
        let limits = Limits::default();
        let valid = EstimationRequest::default();
        assert!(valid.validate(&limits).is_ok());

        let cases = [
            ("dimensions", EstimationRequest { dimensions: 0, ..valid.clone() }),
            ("dimensions", EstimationRequest { dimensions: 21, ..valid.clone() }),
            ("samples", EstimationRequest { samples: 99, ..valid.clone() }),
            ("samples", EstimationRequest { samples: 200_001, ..valid.clone() }),
            ("alpha", EstimationRequest { alpha: 0.0, ..valid.clone() }),
            ("beta", EstimationRequest { beta: 10.5, ..valid.clone() }),
            ("beta", EstimationRequest { beta: f64::NAN, ..valid.clone() }),
        ];

        for (expected, request) in cases {
            match request.validate(&limits) {
                Err(Error::InvalidParameter { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected {expected} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn engine_rejects_empty_requests() {
        let config = EngineConfig::default();
        let empty = EstimationRequest {
            samples: 0,
            ..EstimationRequest::default()
        };

        assert!(simulate_with(&empty, &config, &SinkCallback {}).is_err());
    }

    #[test]
    fn every_method_reports_itself() {
        let config = EngineConfig::default();
        for method in [Method::Standard, Method::Importance, Method::MetropolisHastings] {
            let result =
                simulate_with(&request(method, Distribution::Normal), &config, &SinkCallback {})
                    .unwrap();

            assert_eq!(result.method, method);
            assert_eq!(result.samples_used, 500);
            assert_eq!(result.convergence.sample_sizes.last(), Some(&500));
            assert_eq!(
                result.trace.is_empty(),
                method != Method::MetropolisHastings
            );
        }
    }

    #[test]
    fn result_json_layout() {
        let result = simulate_with(
            &request(Method::Standard, Distribution::Uniform),
            &EngineConfig::default(),
            &SinkCallback {},
        )
        .unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["method"], "standard");
        assert_eq!(json["samples_used"], 500);
        for key in [
            "estimate",
            "variance",
            "ci_low",
            "ci_high",
            "sample_sizes",
            "estimate_series",
            "variance_series",
            "ci_low_series",
            "ci_high_series",
            "trace",
            "autocorrelation",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json.get("acceptance_rate").is_none());
        assert_eq!(json["trace"].as_array().unwrap().len(), 0);

        let parsed: EstimationResult = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.method, result.method);
        assert_eq!(parsed.convergence.sample_sizes, result.convergence.sample_sizes);
    }

    #[test]
    fn quadratic_moment_limits() {
        let limits = Limits::default();

        assert!(QuadraticMomentRequest::default().validate(&limits).is_ok());
        assert!(QuadraticMomentRequest { samples: 1, ..Default::default() }
            .validate(&limits)
            .is_ok());
        assert!(QuadraticMomentRequest { samples: 0, ..Default::default() }
            .validate(&limits)
            .is_err());
        assert!(QuadraticMomentRequest { samples: 1_000_001, ..Default::default() }
            .validate(&limits)
            .is_err());
    }
}
