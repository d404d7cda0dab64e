//! Linear expressions over model variables.

use serde::{Deserialize, Serialize};

/// Index of a variable within its [`LinearProgram`](super::LinearProgram).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in the program's variable list.
    pub fn index(self) -> usize {
        self.0
    }
}

/// An affine expression `Σ coeff·var + constant`.
///
/// Terms are kept in insertion order until [`LinExpr::normalized`] merges
/// duplicates and orders them by variable index.
///
/// # Examples
///
/// ```
/// use u_cvrptw::lp::{LinearProgram, LinExpr, VarKind};
///
/// let mut lp = LinearProgram::new("demo");
/// let a = lp.add_var("a", VarKind::Continuous, 0.0, 10.0);
/// let b = lp.add_var("b", VarKind::Continuous, 0.0, 10.0);
/// let mut e = LinExpr::from(a);
/// e.add_term(b, 2.0);
/// e.add_term(a, 1.5);
/// e.add_constant(4.0);
/// let e = e.normalized();
/// assert_eq!(e.terms(), &[(a, 2.5), (b, 2.0)]);
/// assert_eq!(e.constant(), 4.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinExpr {
    /// The empty expression (zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// A constant expression.
    pub fn constant_expr(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Sum of the given variables, each with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
            constant: 0.0,
        }
    }

    /// Adds `coeff·var`.
    pub fn add_term(&mut self, var: VarId, coeff: f64) -> &mut Self {
        self.terms.push((var, coeff));
        self
    }

    /// Adds a constant offset.
    pub fn add_constant(&mut self, value: f64) -> &mut Self {
        self.constant += value;
        self
    }

    /// Adds `factor·other` to this expression.
    pub fn add_scaled(&mut self, other: &LinExpr, factor: f64) -> &mut Self {
        self.terms
            .extend(other.terms.iter().map(|&(v, c)| (v, c * factor)));
        self.constant += other.constant * factor;
        self
    }

    /// Variable terms.
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    /// Constant offset.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Merges duplicate variables, drops zero coefficients and orders the
    /// terms by variable index.
    pub fn normalized(&self) -> Self {
        let mut terms = self.terms.clone();
        terms.sort_by_key(|&(v, _)| v);
        let mut merged: Vec<(VarId, f64)> = Vec::with_capacity(terms.len());
        for (v, c) in terms {
            if let Some(last) = merged.last_mut() {
                if last.0 == v {
                    last.1 += c;
                    continue;
                }
            }
            merged.push((v, c));
        }
        merged.retain(|&(_, c)| c != 0.0);
        Self {
            terms: merged,
            constant: self.constant,
        }
    }

    /// Evaluates the expression for the given variable values.
    ///
    /// # Panics
    ///
    /// Panics if a term refers to a variable outside `values`.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * values[v.0])
            .sum::<f64>()
            + self.constant
    }
}

impl From<VarId> for LinExpr {
    fn from(var: VarId) -> Self {
        Self {
            terms: vec![(var, 1.0)],
            constant: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_drops_cancelled_terms() {
        let mut e = LinExpr::new();
        e.add_term(VarId(2), 1.0)
            .add_term(VarId(0), 3.0)
            .add_term(VarId(2), -1.0);
        let n = e.normalized();
        assert_eq!(n.terms(), &[(VarId(0), 3.0)]);
    }

    #[test]
    fn test_add_scaled() {
        let mut a = LinExpr::sum([VarId(0), VarId(1)]);
        let mut b = LinExpr::from(VarId(1));
        b.add_constant(2.0);
        a.add_scaled(&b, -1.0);
        let n = a.normalized();
        assert_eq!(n.terms(), &[(VarId(0), 1.0)]);
        assert_eq!(n.constant(), -2.0);
    }

    #[test]
    fn test_evaluate() {
        let mut e = LinExpr::constant_expr(1.0);
        e.add_term(VarId(0), 2.0).add_term(VarId(1), -1.0);
        assert_eq!(e.evaluate(&[3.0, 4.0]), 3.0);
    }
}
