//! Random-walk Metropolis–Hastings.
//!
//! The chain proposes $x' = x + \varepsilon$ with $\varepsilon \sim \mathcal{N}(0, s^2 I)$. The
//! proposal is symmetric, so the Hastings correction cancels and a proposal is accepted with
//! probability $\min(1, p(x')/p(x))$. Every step records the current position, rejected steps
//! therefore repeat the previous one.
use std::f64::consts::PI;
use std::mem;

use crate::callbacks::Callback;
use crate::config::EngineConfig;
use crate::convergence::StreamingSummarizer;
use crate::core::estimators::PlainEstimators;
use crate::core::{squared_norm, Integrand};
use crate::diagnostics::{autocorrelation, TraceWindow};
use crate::engine::{Distribution, EstimationRequest, EstimationResult, Method};
use crate::error::Result;
use crate::rng::RandomSource;

use rand::Rng;

/// The stationary distribution of the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// Standard multivariate normal.
    Normal,
    /// Uniform on the box $[-1, 1]^d$.
    Uniform,
}

impl From<Distribution> for Target {
    fn from(distribution: Distribution) -> Self {
        match distribution {
            Distribution::Uniform => Self::Uniform,
            Distribution::Normal | Distribution::Mixture => Self::Normal,
        }
    }
}

impl Target {
    /// Log-density of the target at `x`, up to a constant for the uniform box.
    pub fn log_density(&self, x: &[f64]) -> f64 {
        match self {
            Self::Normal => {
                let dims = x.len() as f64;
                -0.5 * (squared_norm(x) + dims * (2.0 * PI).ln())
            }
            Self::Uniform => {
                if x.iter().all(|v| (-1.0..=1.0).contains(v)) {
                    0.0
                } else {
                    f64::NEG_INFINITY
                }
            }
        }
    }
}

/// The probability $\min(1, e^{\log\alpha})$ of accepting a proposal. Undefined ratios, which
/// only arise between two points outside of the support, are never accepted.
pub fn acceptance_probability(log_alpha: f64) -> f64 {
    if log_alpha.is_nan() {
        0.0
    } else {
        log_alpha.min(0.0).exp()
    }
}

/// Outcome of a single chain step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The proposal became the new position.
    Accepted,
    /// The chain stayed where it was.
    Rejected,
}

/// State of a Metropolis chain.
#[derive(Clone, Debug)]
pub struct MetropolisChain {
    target: Target,
    step_size: f64,
    current: Vec<f64>,
    current_log_p: f64,
    candidate: Vec<f64>,
    steps: usize,
    accepted: usize,
}

impl MetropolisChain {
    /// Starts a chain at `start`.
    pub fn from_state(target: Target, step_size: f64, start: Vec<f64>) -> Self {
        let current_log_p = target.log_density(&start);

        Self {
            target,
            step_size,
            candidate: vec![0.0; start.len()],
            current: start,
            current_log_p,
            steps: 0,
            accepted: 0,
        }
    }

    /// Starts a chain at a standard normal draw. Draws outside of the support of `target` are
    /// repeated up to `config.max_init_attempts` times, after which the chain starts at the
    /// origin.
    pub fn new<R: Rng>(
        target: Target,
        dimensions: usize,
        config: &EngineConfig,
        rng: &mut RandomSource<R>,
    ) -> Self {
        let mut start = vec![0.0; dimensions];

        for attempt in 0..config.max_init_attempts.max(1) {
            rng.fill_normal(&mut start, 0.0, 1.0);
            if target.log_density(&start).is_finite() {
                if attempt > 0 {
                    tracing::debug!(attempt, "redrew initial chain state");
                }
                return Self::from_state(target, config.chain_step_size, start);
            }
        }

        tracing::debug!("no initial draw inside the support, starting at the origin");
        start.iter_mut().for_each(|v| *v = 0.0);
        Self::from_state(target, config.chain_step_size, start)
    }

    /// The current position.
    pub fn current(&self) -> &[f64] {
        &self.current
    }

    /// The log-density of the target at the current position.
    pub const fn current_log_p(&self) -> f64 {
        self.current_log_p
    }

    /// Number of steps taken so far.
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// Fraction of accepted proposals, zero before the first step.
    pub fn acceptance_rate(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.accepted as f64 / self.steps as f64
        }
    }

    /// Advances the chain by one proposal.
    pub fn step<R: Rng>(&mut self, rng: &mut RandomSource<R>) -> Transition {
        for (candidate, current) in self.candidate.iter_mut().zip(&self.current) {
            *candidate = current + self.step_size * rng.normal();
        }

        let candidate_log_p = self.target.log_density(&self.candidate);
        let log_alpha = candidate_log_p - self.current_log_p;
        let u = rng.uniform();
        self.steps += 1;

        if u.ln() < log_alpha {
            mem::swap(&mut self.current, &mut self.candidate);
            self.current_log_p = candidate_log_p;
            self.accepted += 1;
            Transition::Accepted
        } else {
            Transition::Rejected
        }
    }
}

/// The Metropolis–Hastings pipeline. The chain value of every step is passed to `integrand`; the
/// first coordinate of the most recent `config.trace_len` steps is reported as trace together with
/// its autocorrelation.
///
/// The initial state is redrawn until it lies inside the support (see [`MetropolisChain::new`]),
/// so a uniform chain consumes a different random stream than a chain started from a single draw.
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

    let target = Target::from(request.distribution);
    let mut chain = MetropolisChain::new(target, request.dimensions, config, rng);
    let mut summarizer =
        StreamingSummarizer::<PlainEstimators<f64>, C>::new(request.samples, config, callback);
    let mut window = TraceWindow::new(config.trace_len);

    for _ in 0..request.samples {
        chain.step(rng);
        let position = chain.current();
        summarizer.push(integrand.call(position))?;
        if let Some(&first) = position.first() {
            window.push(first);
        }
    }

    let acceptance_rate = chain.acceptance_rate();
    tracing::debug!(acceptance_rate, "chain finished");

    let trace = window.into_vec();
    let mut result = EstimationResult::from_summary(Method::MetropolisHastings, summarizer.finish()?);
    result.autocorrelation = autocorrelation(&trace, config.max_lag);
    result.trace = trace;
    result.acceptance_rate = Some(acceptance_rate);

    Ok(result)
}
