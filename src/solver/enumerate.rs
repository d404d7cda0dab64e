//! Exhaustive reference backend for small programs.
//!
//! # Algorithm
//!
//! Every assignment of the binary variables is enumerated. Once the binaries
//! are fixed, each row of a routing model has at most two continuous
//! variables with opposite coefficients (`load[j] - load[i] >= c`) or a
//! single one (a bound), so the continuous part is a system of difference
//! constraints. Its feasibility is decided with Bellman–Ford on the
//! constraint graph: the system is feasible iff the graph has no negative
//! cycle, and shortest-path distances give a solution.
//!
//! # Complexity
//!
//! O(2^b · r · c) for b binaries, r rows and c continuous variables, so the
//! backend is bounded to a configurable number of binaries. It exists to
//! test model construction and route extraction without an external engine.

use std::time::Instant;

use tracing::{debug, info};

use super::{Assignment, Incumbent, SolveOptions, SolverAdapter, SolverError, SolverResult};
use crate::lp::{Cmp, LinearProgram, Sense, VarId, VarKind};

const RELAX_EPS: f64 = 1e-9;
const ROW_TOL: f64 = 1e-9;
const CLOCK_CHECK_INTERVAL: u64 = 256;
const MAX_ENUMERABLE: usize = 63;

/// Enumerates binary assignments and checks the continuous remainder.
///
/// # Examples
///
/// ```
/// use u_cvrptw::lp::{Cmp, LinExpr, LinearProgram, Sense, VarKind};
/// use u_cvrptw::solver::{EnumerationSolver, SolveOptions, SolverAdapter, SolverResult};
///
/// let mut lp = LinearProgram::new("pick-one");
/// let a = lp.add_var("a", VarKind::Binary, 0.0, 1.0);
/// let b = lp.add_var("b", VarKind::Binary, 0.0, 1.0);
/// lp.add_constraint("one", LinExpr::sum([a, b]), Cmp::Eq, LinExpr::constant_expr(1.0));
/// let mut cost = LinExpr::new();
/// cost.add_term(a, 3.0).add_term(b, 2.0);
/// lp.set_objective(cost, Sense::Minimize);
///
/// let result = EnumerationSolver::default().solve(&lp, &SolveOptions::default()).unwrap();
/// match result {
///     SolverResult::Optimal { objective, assignment } => {
///         assert_eq!(objective, 2.0);
///         assert_eq!(assignment.value(b), 1.0);
///     }
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EnumerationSolver {
    max_binaries: usize,
}

impl Default for EnumerationSolver {
    fn default() -> Self {
        Self { max_binaries: 20 }
    }
}

impl EnumerationSolver {
    /// Creates a solver refusing programs with more than `max_binaries`
    /// binary variables (at most 63).
    pub fn new(max_binaries: usize) -> Self {
        Self { max_binaries }
    }

    /// Binary-variable limit.
    pub fn max_binaries(&self) -> usize {
        self.max_binaries
    }
}

impl SolverAdapter for EnumerationSolver {
    fn solve(&self, program: &LinearProgram, options: &SolveOptions) -> Result<SolverResult, SolverError> {
        let binaries: Vec<VarId> = (0..program.num_vars())
            .map(VarId)
            .filter(|&v| program.variable(v).kind == VarKind::Binary)
            .collect();
        let limit = self.max_binaries.min(MAX_ENUMERABLE);
        if binaries.len() > limit {
            return Err(SolverError::TooManyBinaries {
                count: binaries.len(),
                limit,
            });
        }
        let mut fixed = vec![false; program.num_vars()];
        for &b in &binaries {
            fixed[b.index()] = true;
        }
        for &(v, _) in program.objective().terms() {
            if !fixed[v.index()] {
                return Err(SolverError::UnsupportedObjective {
                    name: program.variable(v).name.clone(),
                });
            }
        }
        let system = DifferenceSystem::compile(program, &fixed)?;

        let combinations = 1u64 << binaries.len();
        debug!(binaries = binaries.len(), combinations, "enumerating binary assignments");
        let started = Instant::now();
        let mut values = vec![0.0; program.num_vars()];
        let mut best: Option<(f64, Vec<f64>)> = None;

        for mask in 0..combinations {
            if mask % CLOCK_CHECK_INTERVAL == 0 {
                if let Some(limit) = options.time_limit {
                    if started.elapsed() >= limit {
                        info!(checked = mask, "time limit reached");
                        return Ok(SolverResult::TimedOut {
                            incumbent: best.map(|(objective, values)| Incumbent {
                                objective,
                                assignment: Assignment::new(values),
                            }),
                        });
                    }
                }
            }
            for (bit, &b) in binaries.iter().enumerate() {
                values[b.index()] = if (mask >> bit) & 1 == 1 { 1.0 } else { 0.0 };
            }
            let objective = program.objective().evaluate(&values);
            if let Some((incumbent, _)) = &best {
                let improves = match program.sense() {
                    Sense::Minimize => objective < incumbent - ROW_TOL,
                    Sense::Maximize => objective > incumbent + ROW_TOL,
                };
                if !improves {
                    continue;
                }
            }
            if system.complete(&mut values) {
                best = Some((objective, values.clone()));
            }
        }

        let result = match best {
            Some((objective, values)) => SolverResult::Optimal {
                objective,
                assignment: Assignment::new(values),
            },
            None => SolverResult::Infeasible,
        };
        info!(
            status = result.status(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "enumeration finished"
        );
        Ok(result)
    }
}

/// Finds values for the unfixed (continuous) variables of `program` given
/// the values in `fixed`; variables not listed in `fixed` must be
/// continuous.
///
/// Fixed values need not be integral, so this also answers whether a
/// relaxation admits a given fractional arc pattern. Returns `Ok(None)` if
/// no completion exists.
pub fn complete_assignment(
    program: &LinearProgram,
    fixed: &[(VarId, f64)],
) -> Result<Option<Assignment>, SolverError> {
    let mut is_fixed = vec![false; program.num_vars()];
    let mut values = vec![0.0; program.num_vars()];
    for &(v, value) in fixed {
        is_fixed[v.index()] = true;
        values[v.index()] = value;
    }
    let system = DifferenceSystem::compile(program, &is_fixed)?;
    Ok(system.complete(&mut values).then(|| Assignment::new(values)))
}

/// Shape of a row once its fixed variables are substituted.
#[derive(Debug, Clone)]
enum RowShape {
    /// No free variable: `0 cmp rhs'`.
    Constant,
    /// `coeff·v cmp rhs'`.
    Bound { var: usize, coeff: f64 },
    /// `scale·(plus - minus) cmp rhs'`.
    Difference { plus: usize, minus: usize, scale: f64 },
}

#[derive(Debug, Clone)]
struct Row {
    fixed_terms: Vec<(usize, f64)>,
    shape: RowShape,
    cmp: Cmp,
    rhs: f64,
}

/// Rows of a program split into a fixed part and a difference-constraint
/// part over the free variables. Node `free.len()` of the constraint graph
/// is the zero reference.
#[derive(Debug, Clone)]
struct DifferenceSystem {
    free: Vec<usize>,
    rows: Vec<Row>,
    bound_edges: Vec<(usize, usize, f64)>,
}

impl DifferenceSystem {
    fn compile(program: &LinearProgram, fixed: &[bool]) -> Result<Self, SolverError> {
        let mut slot = vec![usize::MAX; program.num_vars()];
        let mut free = Vec::new();
        for (idx, var) in program.variables().iter().enumerate() {
            if fixed[idx] {
                continue;
            }
            if var.kind != VarKind::Continuous {
                return Err(SolverError::UnsupportedVariable {
                    name: var.name.clone(),
                });
            }
            slot[idx] = free.len();
            free.push(idx);
        }
        let zero = free.len();

        let mut bound_edges = Vec::new();
        for (k, &idx) in free.iter().enumerate() {
            let var = &program.variables()[idx];
            if var.upper.is_finite() {
                bound_edges.push((zero, k, var.upper));
            }
            if var.lower.is_finite() {
                bound_edges.push((k, zero, -var.lower));
            }
        }

        let mut rows = Vec::with_capacity(program.num_constraints());
        for c in program.constraints() {
            let mut fixed_terms = Vec::new();
            let mut free_terms = Vec::new();
            for &(v, coeff) in c.expr.terms() {
                if fixed[v.index()] {
                    fixed_terms.push((v.index(), coeff));
                } else {
                    free_terms.push((slot[v.index()], coeff));
                }
            }
            let shape = match free_terms.as_slice() {
                [] => RowShape::Constant,
                &[(var, coeff)] => RowShape::Bound { var, coeff },
                &[(a, ca), (b, cb)] => {
                    if (ca + cb).abs() > 1e-12 * ca.abs().max(cb.abs()) {
                        return Err(SolverError::UnsupportedConstraint {
                            name: c.name.clone(),
                            reason: "continuous coefficients are not opposite",
                        });
                    }
                    if ca > 0.0 {
                        RowShape::Difference { plus: a, minus: b, scale: ca }
                    } else {
                        RowShape::Difference { plus: b, minus: a, scale: cb }
                    }
                }
                _ => {
                    return Err(SolverError::UnsupportedConstraint {
                        name: c.name.clone(),
                        reason: "more than two continuous terms",
                    })
                }
            };
            rows.push(Row {
                fixed_terms,
                shape,
                cmp: c.cmp,
                rhs: c.rhs,
            });
        }

        Ok(Self {
            free,
            rows,
            bound_edges,
        })
    }

    /// Writes feasible values for the free variables into `values` and
    /// returns `true`, or returns `false` if the fixed values admit none.
    fn complete(&self, values: &mut [f64]) -> bool {
        let zero = self.free.len();
        let mut edges = self.bound_edges.clone();

        for row in &self.rows {
            let rhs = row.rhs
                - row
                    .fixed_terms
                    .iter()
                    .map(|&(idx, coeff)| coeff * values[idx])
                    .sum::<f64>();
            // Each row becomes one or two `target - source <= weight` edges.
            let senses: &[Cmp] = match row.cmp {
                Cmp::Eq => &[Cmp::Le, Cmp::Ge],
                Cmp::Le => &[Cmp::Le],
                Cmp::Ge => &[Cmp::Ge],
            };
            match row.shape {
                RowShape::Constant => {
                    if !row.cmp.holds(0.0, rhs, ROW_TOL) {
                        return false;
                    }
                }
                RowShape::Bound { var, coeff } => {
                    let limit = rhs / coeff;
                    for &sense in senses {
                        // dividing by a negative coefficient flips the sense
                        let upper = (sense == Cmp::Le) == (coeff > 0.0);
                        if upper {
                            edges.push((zero, var, limit));
                        } else {
                            edges.push((var, zero, -limit));
                        }
                    }
                }
                RowShape::Difference { plus, minus, scale } => {
                    let limit = rhs / scale;
                    for &sense in senses {
                        if sense == Cmp::Le {
                            edges.push((minus, plus, limit));
                        } else {
                            edges.push((plus, minus, -limit));
                        }
                    }
                }
            }
        }

        let Some(dist) = shortest_paths(zero + 1, &edges) else {
            return false;
        };
        for (k, &idx) in self.free.iter().enumerate() {
            values[idx] = dist[k] - dist[zero];
        }
        true
    }
}

/// Bellman–Ford from a virtual source joined to every node by a zero-weight
/// edge. Returns `None` on a negative cycle.
fn shortest_paths(nodes: usize, edges: &[(usize, usize, f64)]) -> Option<Vec<f64>> {
    let mut dist = vec![0.0; nodes];
    for _ in 0..=nodes {
        let mut changed = false;
        for &(from, to, weight) in edges {
            let candidate = dist[from] + weight;
            if candidate < dist[to] - RELAX_EPS {
                dist[to] = candidate;
                changed = true;
            }
        }
        if !changed {
            return Some(dist);
        }
    }
    None
}
