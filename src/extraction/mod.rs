//! Route extraction.
//!
//! - [`ActivationMatrix`] — arc values after the single rounding rule
//!   ([`is_active`], threshold [`ACTIVATION_THRESHOLD`])
//! - [`RouteExtractor`] — bounded per-vehicle walks with coverage checks

mod activation;
mod extractor;

pub use activation::{is_active, ActivationMatrix, ACTIVATION_THRESHOLD, INTEGRALITY_TOLERANCE};
pub use extractor::RouteExtractor;
