//! # u-cvrptw
//!
//! Capacitated vehicle routing with time windows (CVRPTW) as a mixed-integer
//! linear program: model construction, a solver adapter boundary, route
//! extraction and solution reporting.
//!
//! ## Modules
//!
//! - [`models`] — Input data contract (Node, TimeWindow, Fleet, ProblemInstance, Route)
//! - [`distance`] — Distance and travel time matrices, pluggable metric
//! - [`lp`] — Solver-neutral linear programs and the LP artifact writer
//! - [`model`] — CVRPTW model construction with per-family big-M
//! - [`solver`] — Solver adapter trait, results, enumeration reference backend
//! - [`extraction`] — Arc rounding and route reconstruction
//! - [`evaluation`] — Independent route audit
//! - [`report`] — Solution report and JSON artifact
//! - [`config`] — Scenario configuration
//! - [`error`] — Error taxonomy
//! - [`solve`] — End-to-end pipeline

pub mod config;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod extraction;
pub mod lp;
pub mod model;
pub mod models;
pub mod report;
pub mod solve;
pub mod solver;

pub use solve::{solve_cvrptw, solve_scenario};

/// Installs a test-writer subscriber filtered by `RUST_LOG`; repeated calls
/// are no-ops.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
