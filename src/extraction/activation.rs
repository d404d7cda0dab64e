//! Rounded arc-activation matrix.

use tracing::warn;

use crate::lp::VarId;
use crate::model::CvrptwModel;
use crate::models::Route;
use crate::solver::{Assignment, SolverError};

/// Arc values at or above this threshold are read as active.
pub const ACTIVATION_THRESHOLD: f64 = 0.5;

/// Arc values farther than this from 0 or 1 are logged as fractional.
pub const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// The rounding rule applied wherever an arc value is interpreted.
///
/// # Examples
///
/// ```
/// use u_cvrptw::extraction::is_active;
///
/// assert!(is_active(0.9999997));
/// assert!(is_active(0.5));
/// assert!(!is_active(0.4999));
/// ```
pub fn is_active(value: f64) -> bool {
    value >= ACTIVATION_THRESHOLD
}

/// Which arcs `(i, j)` are travelled, after rounding.
///
/// The diagonal is always inactive.
///
/// # Examples
///
/// ```
/// use u_cvrptw::extraction::ActivationMatrix;
/// use u_cvrptw::models::Route;
///
/// let routes = vec![Route::new(0, vec![0, 2, 1, 0])];
/// let m = ActivationMatrix::from_routes(3, &routes);
/// assert!(m.get(0, 2) && m.get(2, 1) && m.get(1, 0));
/// assert_eq!(m.out_degree(0), 1);
/// assert_eq!(m.to_rows()[2], vec![0, 1, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationMatrix {
    size: usize,
    active: Vec<bool>,
}

impl ActivationMatrix {
    /// An all-inactive matrix over `size` nodes.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            active: vec![false; size * size],
        }
    }

    /// Rounds the arc variables of `model` in `assignment`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::AssignmentLength`] if the assignment does not
    /// hold one value per program variable.
    pub fn from_assignment(model: &CvrptwModel, assignment: &Assignment) -> Result<Self, SolverError> {
        let expected = model.program().num_vars();
        if assignment.len() != expected {
            return Err(SolverError::AssignmentLength {
                expected,
                actual: assignment.len(),
            });
        }
        let n = model.num_nodes();
        let mut matrix = Self::new(n);
        for i in 0..n {
            for j in 0..n {
                let Some(var) = model.arc(i, j) else {
                    continue;
                };
                let value = assignment.value(var);
                if value.min(1.0 - value).abs() > INTEGRALITY_TOLERANCE {
                    warn!(from = i, to = j, value, "fractional arc value");
                }
                matrix.set(i, j, is_active(value));
            }
        }
        Ok(matrix)
    }

    /// Rounds an explicit n×n grid of arc values; diagonal entries are
    /// ignored.
    ///
    /// Returns `None` if the rows do not form a square grid.
    pub fn from_values(rows: &[Vec<f64>]) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|r| r.len() != size) {
            return None;
        }
        let mut matrix = Self::new(size);
        for (i, row) in rows.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                if i != j {
                    matrix.set(i, j, is_active(value));
                }
            }
        }
        Some(matrix)
    }

    /// Activates every arc travelled by `routes`.
    ///
    /// # Panics
    ///
    /// Panics if a route refers to a node `>= size`.
    pub fn from_routes(size: usize, routes: &[Route]) -> Self {
        let mut matrix = Self::new(size);
        for route in routes {
            for (i, j) in route.arcs() {
                if i != j {
                    matrix.set(i, j, true);
                }
            }
        }
        matrix
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if arc `(i, j)` is active.
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.active[i * self.size + j]
    }

    /// Sets arc `(i, j)`.
    pub fn set(&mut self, i: usize, j: usize, active: bool) {
        self.active[i * self.size + j] = active;
    }

    /// Active successors of `i` in increasing order.
    pub fn successors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.size).filter(move |&j| self.get(i, j))
    }

    /// Number of active arcs leaving `i`.
    pub fn out_degree(&self, i: usize) -> usize {
        self.successors(i).count()
    }

    /// Number of active arcs entering `i`.
    pub fn in_degree(&self, i: usize) -> usize {
        (0..self.size).filter(|&j| self.get(j, i)).count()
    }

    /// Arc variable values of `model` equal to this pattern, ready for
    /// [`complete_assignment`](crate::solver::complete_assignment).
    pub fn to_arc_values(&self, model: &CvrptwModel) -> Vec<(VarId, f64)> {
        let n = self.size.min(model.num_nodes());
        let mut values = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if let Some(var) = model.arc(i, j) {
                    values.push((var, if self.get(i, j) { 1.0 } else { 0.0 }));
                }
            }
        }
        values
    }

    /// The matrix as rows of 0/1.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.active
            .chunks(self.size.max(1))
            .take(self.size)
            .map(|row| row.iter().map(|&a| u8::from(a)).collect())
            .collect()
    }
}
