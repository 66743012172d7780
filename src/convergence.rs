//! Streaming summaries of a sample together with a down-sampled convergence trace.
//!
//! A [`StreamingSummarizer`] consumes one value (or one `(value, weight)` pair) at a time and
//! updates its estimators in a single pass. Whenever the number of consumed values is part of the
//! [`ConvergenceSchedule`] the current mean, variance and confidence interval are appended to the
//! [`ConvergenceTrace`]. The final prefix is always part of the schedule, hence the last point of
//! the trace agrees with the summary of the full sample.

use serde::{Deserialize, Serialize};

use crate::callbacks::Callback;
use crate::config::EngineConfig;
use crate::core::estimators::{Estimators, Updateable};
use crate::error::{Error, Result};

/// Decides which prefix lengths of a sample of size `total` are reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvergenceSchedule {
    total: usize,
    stride: usize,
}

impl ConvergenceSchedule {
    /// Every prefix is reported if `total <= max_points`, otherwise every multiple of
    /// `ceil(total / max_points)` plus `total` itself.
    pub fn new(total: usize, max_points: usize) -> Self {
        let max_points = max_points.max(1);
        let stride = if total <= max_points {
            1
        } else {
            total.div_ceil(max_points)
        };

        Self { total, stride }
    }

    /// The distance between two consecutive reported prefixes.
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Returns `true` if the prefix of length `calls` is reported.
    pub const fn contains(&self, calls: usize) -> bool {
        calls > 0 && (calls % self.stride == 0 || calls == self.total)
    }

    /// Number of reported prefixes.
    pub const fn len(&self) -> usize {
        self.total.div_ceil(self.stride)
    }

    /// Returns `true` for an empty sample.
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// The reported prefix lengths in increasing order.
    pub fn sample_sizes(&self) -> impl Iterator<Item = usize> + '_ {
        (1..=self.total).filter(move |&calls| self.contains(calls))
    }
}

/// Running statistics of a prefix of the sample.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ConvergencePoint {
    /// Length of the prefix.
    pub calls: usize,
    /// Running mean.
    pub estimate: f64,
    /// Running variance.
    pub variance: f64,
    /// Lower bound of the confidence interval.
    pub ci_low: f64,
    /// Upper bound of the confidence interval.
    pub ci_high: f64,
}

impl ConvergencePoint {
    /// Evaluates `estimators` with a confidence interval of `z_score` standard errors.
    pub fn from_estimators<E: Estimators<f64>>(estimators: &E, z_score: f64) -> Self {
        let estimate = estimators.mean();
        let half_width = z_score * estimators.std_error();

        Self {
            calls: estimators.calls(),
            estimate,
            variance: estimators.var(),
            ci_low: estimate - half_width,
            ci_high: estimate + half_width,
        }
    }
}

/// The reported convergence points, stored as parallel series.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ConvergenceTrace {
    /// Strictly increasing prefix lengths.
    pub sample_sizes: Vec<usize>,
    /// Running mean at each prefix.
    pub estimate_series: Vec<f64>,
    /// Running variance at each prefix.
    pub variance_series: Vec<f64>,
    /// Lower confidence bound at each prefix.
    pub ci_low_series: Vec<f64>,
    /// Upper confidence bound at each prefix.
    pub ci_high_series: Vec<f64>,
}

impl ConvergenceTrace {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            sample_sizes: Vec::with_capacity(capacity),
            estimate_series: Vec::with_capacity(capacity),
            variance_series: Vec::with_capacity(capacity),
            ci_low_series: Vec::with_capacity(capacity),
            ci_high_series: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, point: &ConvergencePoint) {
        self.sample_sizes.push(point.calls);
        self.estimate_series.push(point.estimate);
        self.variance_series.push(point.variance);
        self.ci_low_series.push(point.ci_low);
        self.ci_high_series.push(point.ci_high);
    }

    /// Number of reported points.
    pub fn len(&self) -> usize {
        self.sample_sizes.len()
    }

    /// Returns `true` if no point was reported.
    pub fn is_empty(&self) -> bool {
        self.sample_sizes.is_empty()
    }

    /// Returns the `index`-th reported point.
    pub fn point(&self, index: usize) -> Option<ConvergencePoint> {
        Some(ConvergencePoint {
            calls: *self.sample_sizes.get(index)?,
            estimate: self.estimate_series[index],
            variance: self.variance_series[index],
            ci_low: self.ci_low_series[index],
            ci_high: self.ci_high_series[index],
        })
    }

    /// Returns the last reported point.
    pub fn last(&self) -> Option<ConvergencePoint> {
        self.len().checked_sub(1).and_then(|index| self.point(index))
    }
}

/// Final statistics of a sample together with its convergence trace.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    /// Number of values consumed.
    pub calls: usize,
    /// Final mean.
    pub estimate: f64,
    /// Final variance.
    pub variance: f64,
    /// Final lower confidence bound.
    pub ci_low: f64,
    /// Final upper confidence bound.
    pub ci_high: f64,
    /// The reported convergence points.
    pub convergence: ConvergenceTrace,
}

/// Single-pass summarizer over a stream of values.
///
/// The estimators `E` decide whether the stream is unweighted ([`PlainEstimators`]) or weighted
/// ([`WeightedEstimators`]).
///
/// [`PlainEstimators`]: crate::core::estimators::PlainEstimators
/// [`WeightedEstimators`]: crate::core::estimators::WeightedEstimators
pub struct StreamingSummarizer<'a, E, C: ?Sized> {
    estimators: E,
    schedule: ConvergenceSchedule,
    z_score: f64,
    trace: ConvergenceTrace,
    callback: &'a C,
}

impl<'a, E, C> StreamingSummarizer<'a, E, C>
where
    E: Estimators<f64> + Default,
    C: Callback + ?Sized,
{
    /// Creates a summarizer for a stream of `total` values.
    pub fn new(total: usize, config: &EngineConfig, callback: &'a C) -> Self {
        let schedule = ConvergenceSchedule::new(total, config.max_points);

        Self {
            estimators: E::default(),
            schedule,
            z_score: config.z_score,
            trace: ConvergenceTrace::with_capacity(schedule.len()),
            callback,
        }
    }

    /// Returns the estimators of all values pushed so far.
    pub fn estimators(&self) -> &E {
        &self.estimators
    }

    /// Consumes the next value of the stream.
    pub fn push<V>(&mut self, value: V) -> Result<()>
    where
        E: Updateable<V>,
    {
        self.estimators.update(value);

        if self.schedule.contains(self.estimators.calls()) {
            self.record()?;
        }

        Ok(())
    }

    fn record(&mut self) -> Result<()> {
        if self.estimators.is_degenerate() {
            let calls = self.estimators.calls();
            tracing::warn!(calls, "weights collapsed to zero");
            return Err(Error::DegenerateWeights { calls });
        }

        let point = ConvergencePoint::from_estimators(&self.estimators, self.z_score);
        self.callback.record(&point);
        self.trace.push(&point);

        Ok(())
    }

    /// Ends the stream and returns the summary. If fewer or more values than announced were
    /// pushed, the current prefix is appended to the trace so that it still ends with the full
    /// sample.
    pub fn finish(mut self) -> Result<Summary> {
        let calls = self.estimators.calls();
        if calls == 0 {
            return Err(Error::invalid("samples", "no values were summarized"));
        }

        if self.trace.last().map(|point| point.calls) != Some(calls) {
            self.record()?;
        }

        let last = self
            .trace
            .last()
            .ok_or_else(|| Error::invalid("samples", "no values were summarized"))?;

        Ok(Summary {
            calls,
            estimate: last.estimate,
            variance: last.variance,
            ci_low: last.ci_low,
            ci_high: last.ci_high,
            convergence: self.trace,
        })
    }
}

/// Summarizes the values yielded by `values` in one pass, reporting the convergence trace to
/// `callback`.
pub fn summarize<E, I, C>(values: I, config: &EngineConfig, callback: &C) -> Result<Summary>
where
    I: IntoIterator,
    I::IntoIter: ExactSizeIterator,
    E: Estimators<f64> + Default + Updateable<I::Item>,
    C: Callback + ?Sized,
{
    let values = values.into_iter();
    let mut summarizer = StreamingSummarizer::<E, C>::new(values.len(), config, callback);

    for value in values {
        summarizer.push(value)?;
    }

    summarizer.finish()
}
