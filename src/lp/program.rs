//! Solver-neutral linear program.

use serde::{Deserialize, Serialize};

use super::{LinExpr, VarId};

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    /// 0/1 variable.
    Binary,
    /// Integer-valued variable within its bounds.
    Integer,
    /// Real-valued variable within its bounds.
    Continuous,
}

/// A named decision variable with bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Name used in the model artifact.
    pub name: String,
    /// Domain.
    pub kind: VarKind,
    /// Lower bound (may be `-inf`).
    #[serde(with = "crate::lp::bound::lower")]
    pub lower: f64,
    /// Upper bound (may be `+inf`).
    #[serde(with = "crate::lp::bound::upper")]
    pub upper: f64,
}

/// Comparison operator of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cmp {
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
    /// `expr == rhs`
    Eq,
}

impl Cmp {
    /// Returns `true` if `lhs cmp rhs` holds within `tol`.
    pub fn holds(self, lhs: f64, rhs: f64, tol: f64) -> bool {
        match self {
            Cmp::Le => lhs <= rhs + tol,
            Cmp::Ge => lhs >= rhs - tol,
            Cmp::Eq => (lhs - rhs).abs() <= tol,
        }
    }
}

/// A named linear constraint `expr cmp rhs` with all variables on the left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Name used in the model artifact and diagnostics.
    pub name: String,
    /// Left-hand side, normalized, without constant.
    pub expr: LinExpr,
    /// Comparison operator.
    pub cmp: Cmp,
    /// Right-hand side constant.
    pub rhs: f64,
}

impl Constraint {
    /// Returns `true` if the constraint holds for `values` within `tol`.
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        self.cmp.holds(self.expr.evaluate(values), self.rhs, tol)
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    /// Minimize the objective.
    Minimize,
    /// Maximize the objective.
    Maximize,
}

/// Variables, constraints, objective and sense of a (mixed-integer) linear
/// program, in insertion order.
///
/// Insertion order is the only order: identical build sequences produce
/// identical programs and identical artifacts.
///
/// # Examples
///
/// ```
/// use u_cvrptw::lp::{Cmp, LinExpr, LinearProgram, Sense, VarKind};
///
/// let mut lp = LinearProgram::new("knapsack");
/// let a = lp.add_var("a", VarKind::Binary, 0.0, 1.0);
/// let b = lp.add_var("b", VarKind::Binary, 0.0, 1.0);
/// let mut weight = LinExpr::new();
/// weight.add_term(a, 3.0).add_term(b, 4.0);
/// lp.add_constraint("weight", weight, Cmp::Le, LinExpr::constant_expr(5.0));
/// let mut value = LinExpr::new();
/// value.add_term(a, 2.0).add_term(b, 3.0);
/// lp.set_objective(value, Sense::Maximize);
/// assert_eq!(lp.num_vars(), 2);
/// assert_eq!(lp.constraints()[0].rhs, 5.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearProgram {
    name: String,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: LinExpr,
    sense: Sense,
}

impl LinearProgram {
    /// Creates an empty minimization program.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: LinExpr::new(),
            sense: Sense::Minimize,
        }
    }

    /// Adds a variable and returns its id.
    pub fn add_var(&mut self, name: impl Into<String>, kind: VarKind, lower: f64, upper: f64) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(Variable {
            name: name.into(),
            kind,
            lower,
            upper,
        });
        id
    }

    /// Adds `lhs cmp rhs`, moving variables left and constants right.
    pub fn add_constraint(&mut self, name: impl Into<String>, lhs: LinExpr, cmp: Cmp, rhs: LinExpr) {
        let mut expr = lhs;
        expr.add_scaled(&rhs, -1.0);
        let expr = expr.normalized();
        let rhs = 0.0 - expr.constant();
        let mut lhs = LinExpr::new();
        for &(v, c) in expr.terms() {
            lhs.add_term(v, c);
        }
        self.constraints.push(Constraint {
            name: name.into(),
            expr: lhs,
            cmp,
            rhs,
        });
    }

    /// Sets the objective function and direction.
    pub fn set_objective(&mut self, objective: LinExpr, sense: Sense) {
        self.objective = objective.normalized();
        self.sense = sense;
    }

    /// Program name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All variables, indexed by [`VarId::index`].
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// The variable behind an id.
    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    /// All constraints in insertion order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The objective expression.
    pub fn objective(&self) -> &LinExpr {
        &self.objective
    }

    /// Optimization direction.
    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Names of the constraints and variable bounds violated by `values`.
    ///
    /// Bound violations are reported as `"bounds:<var>"`.
    pub fn violations(&self, values: &[f64], tol: f64) -> Vec<String> {
        let mut out = Vec::new();
        for (var, &value) in self.variables.iter().zip(values) {
            if value < var.lower - tol || value > var.upper + tol {
                out.push(format!("bounds:{}", var.name));
            }
        }
        for c in &self.constraints {
            if !c.is_satisfied(values, tol) {
                out.push(c.name.clone());
            }
        }
        out
    }
}
