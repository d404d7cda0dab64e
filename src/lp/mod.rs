//! Solver-neutral (mixed-integer) linear programs.
//!
//! - [`LinearProgram`] — variables, constraints, objective and sense
//! - [`LinExpr`] — affine expressions over [`VarId`]s
//! - CPLEX LP writer for the persisted model artifact

pub(crate) mod bound;
mod expr;
mod program;
mod writer;

pub use expr::{LinExpr, VarId};
pub use program::{Cmp, Constraint, LinearProgram, Sense, VarKind, Variable};
