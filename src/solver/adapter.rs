//! Boundary to an external mixed-integer solver.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lp::{LinearProgram, VarId};

/// Variable values indexed by [`VarId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    values: Vec<f64>,
}

impl Assignment {
    /// Wraps one value per program variable.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Value of one variable.
    ///
    /// # Panics
    ///
    /// Panics if `var` belongs to a larger program.
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.index()]
    }

    /// All values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the assignment holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Best feasible solution found before optimality was proven.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incumbent {
    /// Objective value of the incumbent.
    pub objective: f64,
    /// Its variable values.
    pub assignment: Assignment,
}

/// Terminal status of a solve.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverResult {
    /// Proven optimal.
    Optimal {
        /// Optimal objective value.
        objective: f64,
        /// Optimal variable values.
        assignment: Assignment,
    },
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The objective can be improved without limit.
    Unbounded,
    /// The time limit expired first.
    TimedOut {
        /// Best solution found so far, if any.
        incumbent: Option<Incumbent>,
    },
}

impl SolverResult {
    /// Short status label for logs and reports.
    pub fn status(&self) -> &'static str {
        match self {
            SolverResult::Optimal { .. } => "optimal",
            SolverResult::Infeasible => "infeasible",
            SolverResult::Unbounded => "unbounded",
            SolverResult::TimedOut { .. } => "timed_out",
        }
    }
}

/// Options passed through to the solver and to result handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolveOptions {
    /// Wall-clock limit for the solver; `None` waits for a terminal status.
    pub time_limit: Option<Duration>,
    /// Extract routes from a timed-out incumbent instead of failing.
    pub accept_incumbent: bool,
}

impl SolveOptions {
    /// Sets the wall-clock limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Accepts incumbents of timed-out solves.
    pub fn accepting_incumbent(mut self) -> Self {
        self.accept_incumbent = true;
        self
    }
}

/// A backend failure, as opposed to a terminal solver status.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolverError {
    #[error("{count} binary variables exceed the enumeration limit of {limit}")]
    TooManyBinaries { count: usize, limit: usize },
    #[error("variable {name} must be fixed or continuous for this backend")]
    UnsupportedVariable { name: String },
    #[error("constraint {name} is not supported by this backend: {reason}")]
    UnsupportedConstraint { name: String, reason: &'static str },
    #[error("objective references continuous variable {name}")]
    UnsupportedObjective { name: String },
    #[error("backend returned {actual} values for a program with {expected} variables")]
    AssignmentLength { expected: usize, actual: usize },
}

/// An opaque MILP engine.
///
/// Implementations perform no semantic validation: the caller submits a
/// sound program. A backend that cannot express the program returns a
/// [`SolverError`]; every other outcome is a [`SolverResult`].
pub trait SolverAdapter {
    /// Optimizes `program`, honoring `options.time_limit` when set.
    fn solve(&self, program: &LinearProgram, options: &SolveOptions) -> Result<SolverResult, SolverError>;
}

impl<S: SolverAdapter + ?Sized> SolverAdapter for &S {
    fn solve(&self, program: &LinearProgram, options: &SolveOptions) -> Result<SolverResult, SolverError> {
        (**self).solve(program, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(SolverResult::Infeasible.status(), "infeasible");
        assert_eq!(
            SolverResult::TimedOut { incumbent: None }.status(),
            "timed_out"
        );
    }

    #[test]
    fn test_options_builders() {
        let o = SolveOptions::default()
            .with_time_limit(Duration::from_secs(5))
            .accepting_incumbent();
        assert_eq!(o.time_limit, Some(Duration::from_secs(5)));
        assert!(o.accept_incumbent);
    }
}
