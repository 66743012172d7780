//! Implementation of different callback functions.
use crate::convergence::ConvergencePoint;

/// Trait for observing an estimation while it runs.
pub trait Callback {
    /// This method is called every time the summarizer records a point of the convergence trace.
    fn record(&self, point: &ConvergencePoint);
}

/// A callback function that does nothing
pub struct SinkCallback {}

impl Callback for SinkCallback {
    fn record(&self, _: &ConvergencePoint) {}
}

/// A callback function that emits every convergence point as a `TRACE` event.
pub struct TracingCallback {}

impl Callback for TracingCallback {
    fn record(&self, point: &ConvergencePoint) {
        tracing::trace!(
            calls = point.calls,
            estimate = point.estimate,
            variance = point.variance,
            ci_low = point.ci_low,
            ci_high = point.ci_high,
            "convergence point"
        );
    }
}
