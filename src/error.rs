//! Error taxonomy.
//!
//! Configuration problems are caught before any solver call, terminal solver
//! statuses are surfaced verbatim, and structural failures during route
//! extraction indicate a modeling or rounding defect.

use crate::solver::SolverError;

/// Malformed or infeasible-by-construction input.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("instance has no nodes; node 0 must be the depot")]
    EmptyInstance,
    #[error("node at position {index} has id {id}; node ids must equal their position")]
    NodeIdMismatch { index: usize, id: usize },
    #[error("{matrix} matrix has size {actual}, expected {expected} to match the node list")]
    MatrixShape {
        matrix: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("matrix of size {size} carries {actual} entries, expected {size}²")]
    MatrixDataLength { size: usize, actual: usize },
    #[error("{matrix} matrix entry ({from}, {to}) is {value}; entries must be finite and non-negative")]
    InvalidMatrixEntry {
        matrix: &'static str,
        from: usize,
        to: usize,
        value: f64,
    },
    #[error("vehicle count must be positive")]
    NoVehicles,
    #[error("vehicle capacity {0} is negative")]
    NegativeCapacity(i32),
    #[error("node {node} has negative demand {demand}")]
    NegativeDemand { node: usize, demand: i32 },
    #[error("depot demand must be zero, found {0}")]
    DepotDemand(i32),
    #[error("customer {node}: earliest start {earliest} exceeds latest start {latest}")]
    InvertedTimeWindow {
        node: usize,
        earliest: f64,
        latest: f64,
    },
    #[error("day start {0} must be finite and non-negative")]
    InvalidDayStart(f64),
    #[error("depot window [{earliest}, {latest}] does not contain the day start {day_start}")]
    DepotWindow {
        day_start: f64,
        earliest: f64,
        latest: f64,
    },
    #[error("node {node} has service duration {duration}; it must be finite and non-negative")]
    InvalidServiceDuration { node: usize, duration: f64 },
    #[error("customer {node}: demand {demand} exceeds vehicle capacity {capacity}")]
    DemandExceedsCapacity {
        node: usize,
        demand: i32,
        capacity: i32,
    },
    #[error("neither capacity nor time-window propagation is enabled; sub-tours would not be eliminated")]
    NoSubtourElimination,
    #[error("customers {nodes:?} form a cycle along which no enabled propagation family increases; it cannot be ruled out as a sub-tour")]
    UnbrokenSubtour { nodes: Vec<usize> },
    #[error("fixed big-M for {family} is {value}; it must be finite and non-negative")]
    InvalidBigM { family: &'static str, value: f64 },
    #[error("time limit of {0} seconds must be finite and non-negative")]
    InvalidTimeLimit(f64),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A terminal solver status that yields no usable routes.
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    #[error("solver proved the model infeasible")]
    Infeasible,
    #[error("solver reported the model unbounded")]
    Unbounded,
    #[error("solver hit its time limit (best incumbent objective: {incumbent_objective:?})")]
    TimedOut { incumbent_objective: Option<f64> },
    #[error("solver backend failed: {0}")]
    Backend(#[from] SolverError),
}

/// A route-extraction post-condition failed.
///
/// These never occur for a sound model solved to integrality; each variant
/// carries the offending nodes so the failure can be reproduced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructuralError {
    #[error("activation matrix covers {actual} nodes, model has {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("{outgoing} arcs leave the depot but {incoming} return to it")]
    DepotFlowMismatch { outgoing: usize, incoming: usize },
    #[error("node {node} has several active out-arcs to {successors:?}")]
    MultipleSuccessors { node: usize, successors: Vec<usize> },
    #[error("route leaving the depot towards {route_start} stops at node {node}, which has no active out-arc")]
    DeadEnd { route_start: usize, node: usize },
    #[error("route leaving the depot towards {route_start} did not return within {limit} steps: {path:?}")]
    Unterminated {
        route_start: usize,
        limit: usize,
        path: Vec<usize>,
    },
    #[error("route {route} does not start and end at the depot: {path:?}")]
    NotAnchored { route: usize, path: Vec<usize> },
    #[error("customer {node} is visited {occurrences} times")]
    DuplicateCustomer { node: usize, occurrences: usize },
    #[error("customers {nodes:?} are not on any depot route")]
    MissingCustomers { nodes: Vec<usize> },
}

/// Any failure of the build → solve → extract pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CvrptwError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error("internal defect during route extraction: {0}")]
    Structural(#[from] StructuralError),
}
