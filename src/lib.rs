#![warn(clippy::all, clippy::cargo, clippy::nursery, clippy::pedantic)]
#![warn(missing_docs)]

//! The crate `mcconverge` estimates [expectation values] with three [Monte Carlo] methods and
//! reports, next to the final estimate, how the estimate converged while the sample grew.
//!
//! # Features
//!
//! - **Three sampling methods**. Plain Monte Carlo with independent samples, self-normalised
//! importance sampling and a random-walk Metropolis–Hastings chain all produce the same
//! [`EstimationResult`], so that their convergence behaviour can be compared directly.
//! - **Convergence traces**. The running mean, variance and confidence interval are computed in a
//! single pass over the sample and down-sampled to at most a few hundred points, always including
//! the full sample as the final point.
//! - **Chain diagnostics**. Metropolis–Hastings runs also report the most recent part of the chain
//! together with its autocorrelation and the acceptance rate of the proposals.
//! - **Reproducibility**. Every sampler draws through a single seedable [`RandomSource`]. Two runs
//! with the same request and the same seed give bit-identical results.
//! - **Generic estimators**. The [estimators](crate::core::estimators) work with any numeric type
//! that implements the `Float` trait of the `num-traits` crate.
//! - **HTTP adapter**. With the default `server` feature the engine is exposed as a small JSON API,
//! see the [`server`] module.
//!
//! # How do I get started?
//!
//! ```
//! use mcconverge::{simulate, Distribution, EstimationRequest, Method};
//!
//! let request = EstimationRequest {
//!     method: Method::Standard,
//!     distribution: Distribution::Uniform,
//!     dimensions: 1,
//!     samples: 10_000,
//!     seed: Some(42),
//!     ..EstimationRequest::default()
//! };
//!
//! let result = simulate(&request).unwrap();
//! assert_eq!(result.samples_used, 10_000);
//! assert!(result.ci_low <= result.estimate && result.estimate <= result.ci_high);
//! ```
//!
//! # What is ...?
//!
//! Every pipeline estimates the expectation of the Gaussian kernel
//!
//! $$ E[f] = \int \mathrm{d}^d x \, p(x) f(x), \qquad f(x) = \exp \left( -\frac{1}{2} \lVert x
//! \rVert^2 \right) $$
//!
//! with the sample mean
//!
//! $$ E[f] \approx \frac{1}{N} \sum_{j=1}^N f \left( x^{(j)} \right) $$
//!
//! where the points $x^{(j)}$ are drawn from $p$ directly, from a Markov chain whose stationary
//! distribution is $p$, or from a proposal $q$ and weighted by $p/q$. We use the following terms:
//!
//! - the number of *calls* or the *sample size* is $N$,
//! - the number of *dimensions*, $d$, is the number of coordinates of each point,
//! - a *prefix* is the first $n \leq N$ values of the sample; the convergence trace reports the
//! statistics of selected prefixes,
//! - the *effective sample size* of a weighted sample is $(\sum_j w_j)^2 / \sum_j w_j^2$, which
//! replaces $N$ in the standard error of importance sampling.
//!
//! [expectation values]: https://en.wikipedia.org/wiki/Expected_value
//! [Monte Carlo]: https://en.wikipedia.org/wiki/Monte_Carlo_integration

pub mod callbacks;
pub mod config;
pub mod convergence;
pub mod core;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod integrators;
pub mod rng;
#[cfg(feature = "server")]
pub mod server;

pub use crate::config::{EngineConfig, Limits};
pub use crate::engine::{
    simulate, simulate_with, simulate_with_rng, Distribution, EstimationRequest, EstimationResult,
    Method, QuadraticMomentRequest,
};
pub use crate::error::{Error, Result};
pub use crate::rng::RandomSource;
