//! Solver boundary.
//!
//! - [`SolverAdapter`] — the contract an external MILP engine fulfils
//! - [`SolverResult`] — terminal statuses (`Optimal`, `Infeasible`,
//!   `Unbounded`, `TimedOut`)
//! - [`EnumerationSolver`] — exhaustive reference backend for small models
//! - [`complete_assignment`] — continuous feasibility for fixed arc values

mod adapter;
mod enumerate;

pub use adapter::{Assignment, Incumbent, SolveOptions, SolverAdapter, SolverError, SolverResult};
pub use enumerate::{complete_assignment, EnumerationSolver};
