//! Solver interface for 0-1 integer linear programs
//!
//! The tracking ILP talks to its solver only through the traits in this
//! module:
//!
//! - [`SolverEnvironment`] - explicitly opened handle that creates models
//! - [`IlpModel`] - one model: binary variables, linear constraints,
//!   optimize and read back
//!
//! [`BranchAndBoundEnv`] is the built-in back end. [`lp_format`] writes any
//! model out in CPLEX LP format.

pub mod branch_bound;
pub mod lp_format;

pub use branch_bound::{BranchAndBoundEnv, BranchAndBoundModel};
pub use lp_format::write_lp;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::SolverError;

/// Handle of a binary decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub usize);

/// Handle of a linear constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstrId(pub usize);

/// Comparison of a linear constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sense {
    /// `expr <= rhs`
    LessEqual,
    /// `expr == rhs`
    Equal,
    /// `expr >= rhs`
    GreaterEqual,
}

impl Sense {
    /// True if the constraint bounds the expression from above
    #[inline]
    pub fn has_upper(self) -> bool {
        matches!(self, Sense::LessEqual | Sense::Equal)
    }

    /// True if the constraint bounds the expression from below
    #[inline]
    pub fn has_lower(self) -> bool {
        matches!(self, Sense::GreaterEqual | Sense::Equal)
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::LessEqual => write!(f, "<="),
            Sense::Equal => write!(f, "=="),
            Sense::GreaterEqual => write!(f, ">="),
        }
    }
}

/// Sparse linear expression `sum(coef * var)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinExpr {
    /// Empty expression
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `coef * var`
    pub fn add_term(&mut self, coef: f64, var: VarId) {
        self.terms.push((var, coef));
    }

    /// Builder-style [`LinExpr::add_term`]
    pub fn with_term(mut self, coef: f64, var: VarId) -> Self {
        self.add_term(coef, var);
        self
    }

    /// Terms in insertion order (a variable may appear more than once)
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    /// Number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if the expression has no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate the expression for a full assignment of variable values
    pub fn evaluate(&self, values: impl Fn(VarId) -> f64) -> f64 {
        self.terms.iter().map(|&(v, c)| c * values(v)).sum()
    }
}

impl FromIterator<(VarId, f64)> for LinExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

/// Copy of one live constraint, as listed by [`IlpModel::constraint_rows`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintRow {
    pub name: String,
    pub expr: LinExpr,
    pub sense: Sense,
    pub rhs: f64,
}

/// Terminal state reported by a back end after `optimize`
///
/// The tracking layer folds anything it does not recognise into
/// `IlpStatus::LimitReached`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendStatus {
    /// Proven optimal solution
    Optimal,
    /// No feasible solution exists
    Infeasible,
    /// Objective unbounded below
    Unbounded,
    /// Feasible solution available, optimality not proven
    Suboptimal,
    /// Numerical trouble
    Numeric,
    /// Node limit hit before any solution was found
    NodeLimit,
    /// Time limit hit before any solution was found
    TimeLimit,
    /// Interrupted by the caller
    Interrupted,
}

impl BackendStatus {
    /// True if variable values can be read after this status
    pub fn has_solution(self) -> bool {
        matches!(self, BackendStatus::Optimal | BackendStatus::Suboptimal)
    }
}

/// One 0-1 integer linear program
///
/// Additions and removals are pending until [`IlpModel::update`] (or
/// [`IlpModel::optimize`], which commits implicitly). Variable values refer
/// to the last optimize.
pub trait IlpModel {
    /// Add a binary variable with the given objective coefficient
    fn add_binary_var(&mut self, objective: f64, name: &str) -> Result<VarId, SolverError>;

    /// Add a named linear constraint
    fn add_constraint(
        &mut self,
        expr: &LinExpr,
        sense: Sense,
        rhs: f64,
        name: &str,
    ) -> Result<ConstrId, SolverError>;

    /// Remove a previously added constraint
    fn remove_constraint(&mut self, constr: ConstrId) -> Result<(), SolverError>;

    /// Commit pending additions and removals
    fn update(&mut self) -> Result<(), SolverError>;

    /// Minimize the objective
    fn optimize(&mut self) -> Result<BackendStatus, SolverError>;

    /// Value of a variable in the last solution
    fn value(&self, var: VarId) -> Result<f64, SolverError>;

    /// Objective coefficient of a variable
    fn objective_coefficient(&self, var: VarId) -> Result<f64, SolverError>;

    /// Replace the objective coefficient of a variable
    ///
    /// Values and objective value of the last solution are left as they were.
    fn set_objective_coefficient(&mut self, var: VarId, objective: f64) -> Result<(), SolverError>;

    /// Objective value of the last solution
    fn objective_value(&self) -> Result<f64, SolverError>;

    /// Name given to a variable
    fn var_name(&self, var: VarId) -> Result<&str, SolverError>;

    /// Number of variables (committed or pending)
    fn num_vars(&self) -> usize;

    /// Number of live constraints (committed or pending, not removed)
    fn num_constraints(&self) -> usize;

    /// Live constraints in insertion order
    fn constraint_rows(&self) -> Vec<ConstraintRow>;
}

/// Handle that owns solver-wide settings and creates models
///
/// Constructed explicitly by the caller and passed down; one environment
/// may serve many growth lines, also concurrently when it is `Sync`.
pub trait SolverEnvironment {
    /// Model type produced by this environment
    type Model: IlpModel;

    /// Create an empty model
    fn new_model(&self, name: &str) -> Result<Self::Model, SolverError>;

    /// Back-end name for logs
    fn name(&self) -> &'static str;
}
