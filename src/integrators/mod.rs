//! One module per sampling method.
//!
//! Each module has a sampler that draws one point at a time, and a `run` function that pipes the
//! points through an integrand into a [`StreamingSummarizer`].
//!
//! [`StreamingSummarizer`]: crate::convergence::StreamingSummarizer
pub mod importance;
pub mod metropolis;
pub mod plain;
