//! Diagnostics for Markov chain samples.
use std::collections::VecDeque;

/// Normalised autocorrelation of `trace` for the lags `0..=max_lag`.
///
/// The trace is centred around its mean and
///
/// $$ \rho_k = \frac{\sum_{i=0}^{n-k-1} c_i c_{i+k}}{\sum_{i=0}^{n-1} c_i^2} $$
///
/// is returned for each lag $k$. Lags at least as long as the trace have no overlapping pairs and
/// evaluate to zero. A constant (or empty) trace yields one followed by zeros.
pub fn autocorrelation(trace: &[f64], max_lag: usize) -> Vec<f64> {
    let mut acf = vec![0.0; max_lag + 1];
    acf[0] = 1.0;

    if trace.is_empty() {
        return acf;
    }

    let mean = trace.iter().sum::<f64>() / trace.len() as f64;
    let centered: Vec<f64> = trace.iter().map(|x| x - mean).collect();
    let denom = dot(&centered, &centered);

    if denom == 0.0 {
        return acf;
    }

    for (lag, value) in acf.iter_mut().enumerate().skip(1) {
        if lag < centered.len() {
            *value = dot(&centered[..centered.len() - lag], &centered[lag..]) / denom;
        }
    }

    acf
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Keeps the `capacity` most recent values of a stream.
#[derive(Clone, Debug)]
pub struct TraceWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl TraceWindow {
    /// An empty window holding at most `capacity` values.
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `value`, evicting the oldest value once the window is full.
    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Number of values currently held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the window holds no value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The held values from oldest to newest.
    pub fn into_vec(self) -> Vec<f64> {
        self.values.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn constant_trace() {
        let acf = autocorrelation(&[0.4; 100], 40);

        assert_eq!(acf.len(), 41);
        assert_eq!(acf[0], 1.0);
        assert!(acf[1..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn alternating_trace() {
        let trace: Vec<f64> = (0..10).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let acf = autocorrelation(&trace, 3);

        assert_eq!(acf[0], 1.0);
        assert_approx_eq!(acf[1], -0.9, 1e-15);
        assert_approx_eq!(acf[2], 0.8, 1e-15);
        assert_approx_eq!(acf[3], -0.7, 1e-15);
    }

    #[test]
    fn lags_beyond_trace_are_zero() {
        let acf = autocorrelation(&[1.0, 2.0, 3.0], 5);

        assert_eq!(acf.len(), 6);
        assert_eq!(acf[0], 1.0);
        // centred values -1, 0, 1
        assert_approx_eq!(acf[1], 0.0, 1e-15);
        assert_approx_eq!(acf[2], -0.5, 1e-15);
        assert_eq!(&acf[3..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_trace() {
        assert_eq!(autocorrelation(&[], 2), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn window_keeps_most_recent_values() {
        let mut window = TraceWindow::new(3);
        for i in 0..5 {
            window.push(f64::from(i));
        }

        assert_eq!(window.len(), 3);
        assert_eq!(window.into_vec(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn window_shorter_than_capacity() {
        let mut window = TraceWindow::new(1000);
        window.push(1.5);

        assert!(!window.is_empty());
        assert_eq!(window.into_vec(), vec![1.5]);
    }
}
