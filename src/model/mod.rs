//! CVRPTW problem model.
//!
//! Translates a [`ProblemInstance`](crate::models::ProblemInstance) into a
//! [`LinearProgram`](crate::lp::LinearProgram):
//!
//! - binary arc variables `x[i,j]` for every ordered pair of distinct nodes
//! - continuous `load[i]` (capacity propagation) and `start[i]`
//!   (service-start propagation), each block optional
//! - depot exit bound, depot flow balance, unit in/out degree per customer
//! - big-M conditional propagation constraints, which also rule out
//!   sub-tours that skip the depot
//! - minimum total distance objective

mod big_m;
mod builder;
mod config;

pub use big_m::{BigM, BigMFamily};
pub use builder::{CvrptwModel, ModelWarning};
pub use config::{BigMPolicy, FleetUsage, ModelConfig};
