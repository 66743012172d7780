//! Error types shared by all estimation pipelines.

use thiserror::Error;

/// Errors reported by the estimation engine.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// A request or sampler parameter is outside of its valid range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Description of the accepted range.
        reason: String,
    },

    /// Every importance weight up to a reported prefix underflowed to zero, so the weighted mean
    /// is undefined.
    #[error("importance weights sum to zero after {calls} samples")]
    DegenerateWeights {
        /// Number of samples consumed when the collapse was detected.
        calls: usize,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
