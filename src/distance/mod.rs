//! Distance and travel time matrices.
//!
//! Provides a dense matrix type and the [`DistanceProvider`] seam through
//! which the distance metric is plugged in.

mod matrix;
mod provider;

pub use matrix::DistanceMatrix;
pub use provider::{DistanceProvider, Euclidean};
