//! This module contains everything related to estimators.
use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Basic estimators, like the mean, variance, and the standard deviation.
pub trait BasicEstimators<T: Float> {
    /// Returns the mean value.
    fn mean(&self) -> T;

    /// Returns the (sample) variance, $V$.
    fn var(&self) -> T;

    /// Returns the standard deviation, $\sigma = \sqrt{V}$.
    fn std(&self) -> T {
        self.var().sqrt()
    }
}

/// More estimators.
pub trait Estimators<T: Float>: BasicEstimators<T> {
    /// Returns the number of values, $N$, this estimator has seen.
    fn calls(&self) -> usize;

    /// Returns the number of independent samples the estimator is worth. For unweighted samples
    /// this is $N$ itself.
    fn effective_calls(&self) -> T;

    /// Returns the standard error of the mean, $\sqrt{V / N_\mathrm{eff}}$.
    fn std_error(&self) -> T {
        (self.var() / self.effective_calls()).sqrt()
    }

    /// Returns `true` if the mean is undefined for the values seen so far.
    fn is_degenerate(&self) -> bool {
        false
    }
}

/// Everything that needs to be updated.
pub trait Updateable<V> {
    /// Update this estimator with `value`.
    fn update(&mut self, value: V);
}

fn count<T: Float + FromPrimitive>(n: usize) -> T {
    // every float type can represent a sample count, if only approximately
    T::from_usize(n).unwrap_or_else(T::max_value)
}

/// Running sums of an unweighted sample.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PlainEstimators<T> {
    sum: T,
    sumsq: T,
    calls: usize,
}

impl<T: Float> Default for PlainEstimators<T> {
    fn default() -> Self {
        Self {
            sum: T::zero(),
            sumsq: T::zero(),
            calls: 0,
        }
    }
}

impl<T: Float> Add for PlainEstimators<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            sum: self.sum + other.sum,
            sumsq: self.sumsq + other.sumsq,
            calls: self.calls + other.calls,
        }
    }
}

impl<T> BasicEstimators<T> for PlainEstimators<T>
where
    T: Float + FromPrimitive,
{
    fn mean(&self) -> T {
        self.sum / count(self.calls)
    }

    /// The unbiased sample variance $(S_2 - S^2/N)/(N-1)$, defined as zero for $N \le 1$.
    fn var(&self) -> T {
        if self.calls < 2 {
            return T::zero();
        }

        let calls = count::<T>(self.calls);
        let var = (self.sumsq - self.sum * self.sum / calls) / (calls - T::one());
        var.max(T::zero())
    }
}

impl<T> Estimators<T> for PlainEstimators<T>
where
    T: Float + FromPrimitive,
{
    fn calls(&self) -> usize {
        self.calls
    }

    fn effective_calls(&self) -> T {
        count(self.calls)
    }
}

impl<T> Updateable<T> for PlainEstimators<T>
where
    T: AddAssign + Float,
{
    fn update(&mut self, value: T) {
        self.calls += 1;
        self.sum += value;
        self.sumsq += value * value;
    }
}

/// Running sums of a sample where each value carries a non-negative weight.
///
/// The mean is the self-normalised estimator $\sum w v / \sum w$ and the variance is the weighted
/// population variance. The effective sample size is Kish's
/// $N_\mathrm{eff} = (\sum w)^2 / \sum w^2$, clamped from below at one.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct WeightedEstimators<T> {
    sum_w: T,
    sum_wv: T,
    sum_wv2: T,
    sum_w2: T,
    calls: usize,
}

impl<T: Float> Default for WeightedEstimators<T> {
    fn default() -> Self {
        Self {
            sum_w: T::zero(),
            sum_wv: T::zero(),
            sum_wv2: T::zero(),
            sum_w2: T::zero(),
            calls: 0,
        }
    }
}

impl<T: Float> Add for WeightedEstimators<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            sum_w: self.sum_w + other.sum_w,
            sum_wv: self.sum_wv + other.sum_wv,
            sum_wv2: self.sum_wv2 + other.sum_wv2,
            sum_w2: self.sum_w2 + other.sum_w2,
            calls: self.calls + other.calls,
        }
    }
}

impl<T: Float> WeightedEstimators<T> {
    /// Returns the sum of all weights seen so far.
    pub fn total_weight(&self) -> T {
        self.sum_w
    }
}

impl<T: Float> BasicEstimators<T> for WeightedEstimators<T> {
    fn mean(&self) -> T {
        self.sum_wv / self.sum_w
    }

    fn var(&self) -> T {
        let mean = self.mean();
        (self.sum_wv2 / self.sum_w - mean * mean).max(T::zero())
    }
}

impl<T> Estimators<T> for WeightedEstimators<T>
where
    T: Float + FromPrimitive,
{
    fn calls(&self) -> usize {
        self.calls
    }

    fn effective_calls(&self) -> T {
        (self.sum_w * self.sum_w / self.sum_w2).max(T::one())
    }

    fn is_degenerate(&self) -> bool {
        self.sum_w == T::zero()
    }
}

impl<T> Updateable<(T, T)> for WeightedEstimators<T>
where
    T: AddAssign + Float,
{
    fn update(&mut self, (value, weight): (T, T)) {
        let wv = weight * value;

        self.calls += 1;
        self.sum_w += weight;
        self.sum_wv += wv;
        self.sum_wv2 += wv * value;
        self.sum_w2 += weight * weight;
    }
}
