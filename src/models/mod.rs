//! Domain model types for the CVRPTW.
//!
//! Provides the input data contract: nodes with demands and time windows,
//! a homogeneous fleet, the validated problem instance, and the routes
//! produced once a solution has been extracted.

mod fleet;
mod instance;
mod node;
mod route;

pub use fleet::Fleet;
pub use instance::ProblemInstance;
pub use node::{Node, TimeWindow};
pub use route::Route;
