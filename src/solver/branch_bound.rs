//! Exact branch and bound for pure 0-1 programs
//!
//! Depth-first search over binary variables with:
//! - bound propagation on every row (a free variable is fixed as soon as one
//!   of its values would make a row unsatisfiable)
//! - a set-packing lower bound: rows of the form `sum(x) <= 1` allow at most
//!   one of their negative-cost variables to contribute
//! - a deterministic branching order (most negative objective first, trying
//!   the improving value first)
//!
//! The search is exact when it terminates; node and time limits turn it into
//! a heuristic that still reports the best solution found.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use nalgebra::DVector;

use super::{
    BackendStatus, ConstrId, ConstraintRow, IlpModel, LinExpr, Sense, SolverEnvironment, VarId,
};
use crate::config::SolverConfig;
use crate::errors::SolverError;

const FREE: i8 = -1;

/// How often (in nodes) the wall clock is checked
const TIME_CHECK_INTERVAL: u64 = 256;

// ============================================================================
// Environment
// ============================================================================

/// Environment of the built-in back end
///
/// Holds the solver settings shared by every model it creates.
#[derive(Debug, Clone)]
pub struct BranchAndBoundEnv {
    config: SolverConfig,
}

impl BranchAndBoundEnv {
    /// Open an environment with the given settings
    pub fn open(config: SolverConfig) -> Self {
        log::debug!(
            "Opening branch-and-bound environment (node limit {:?}, time limit {:?}s)",
            config.node_limit,
            config.time_limit_secs
        );
        Self { config }
    }

    /// Settings shared by all models
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Close the environment
    pub fn close(self) {
        log::debug!("Closing branch-and-bound environment");
    }
}

impl Default for BranchAndBoundEnv {
    fn default() -> Self {
        Self::open(SolverConfig::default())
    }
}

impl SolverEnvironment for BranchAndBoundEnv {
    type Model = BranchAndBoundModel;

    fn new_model(&self, name: &str) -> Result<Self::Model, SolverError> {
        Ok(BranchAndBoundModel::new(name, self.config.clone()))
    }

    fn name(&self) -> &'static str {
        "branch-and-bound"
    }
}

// ============================================================================
// Model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowState {
    Pending,
    Active,
    Removed,
}

#[derive(Debug, Clone)]
struct Row {
    name: String,
    terms: Vec<(usize, f64)>,
    sense: Sense,
    rhs: f64,
    state: RowState,
}

/// Statistics of the last search
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    /// Search nodes visited
    pub nodes: u64,
    /// Number of improving solutions found
    pub incumbents: u64,
    /// Wall-clock time of the search
    pub elapsed: Duration,
}

/// Model of the built-in back end
#[derive(Debug, Clone)]
pub struct BranchAndBoundModel {
    name: String,
    config: SolverConfig,
    var_names: Vec<String>,
    objective: Vec<f64>,
    rows: Vec<Row>,
    pending_removals: Vec<usize>,
    solution: Option<DVector<f64>>,
    objective_value: Option<f64>,
    stats: SearchStats,
}

impl BranchAndBoundModel {
    /// Create an empty model
    pub fn new(name: &str, config: SolverConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            var_names: Vec::new(),
            objective: Vec::new(),
            rows: Vec::new(),
            pending_removals: Vec::new(),
            solution: None,
            objective_value: None,
            stats: SearchStats::default(),
        }
    }

    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Statistics of the last optimize
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Name of a constraint
    pub fn constraint_name(&self, constr: ConstrId) -> Result<&str, SolverError> {
        self.rows
            .get(constr.0)
            .map(|r| r.name.as_str())
            .ok_or(SolverError::UnknownConstraint { index: constr.0 })
    }

    /// Merge duplicate variables and drop zero coefficients
    fn normalize_terms(&self, expr: &LinExpr, name: &str) -> Result<Vec<(usize, f64)>, SolverError> {
        let mut terms: Vec<(usize, f64)> = Vec::with_capacity(expr.len());
        for &(var, coef) in expr.terms() {
            if var.0 >= self.objective.len() {
                return Err(SolverError::UnknownVariable { index: var.0 });
            }
            if !coef.is_finite() {
                return Err(SolverError::NonFiniteCoefficient {
                    name: name.to_string(),
                });
            }
            terms.push((var.0, coef));
        }
        terms.sort_by_key(|&(j, _)| j);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(terms.len());
        for (j, coef) in terms {
            match merged.last_mut() {
                Some((last, acc)) if *last == j => *acc += coef,
                _ => merged.push((j, coef)),
            }
        }
        merged.retain(|&(_, c)| c != 0.0);
        Ok(merged)
    }
}

impl IlpModel for BranchAndBoundModel {
    fn add_binary_var(&mut self, objective: f64, name: &str) -> Result<VarId, SolverError> {
        if !objective.is_finite() {
            return Err(SolverError::NonFiniteCoefficient {
                name: name.to_string(),
            });
        }
        let id = VarId(self.objective.len());
        self.objective.push(objective);
        self.var_names.push(name.to_string());
        Ok(id)
    }

    fn add_constraint(
        &mut self,
        expr: &LinExpr,
        sense: Sense,
        rhs: f64,
        name: &str,
    ) -> Result<ConstrId, SolverError> {
        if !rhs.is_finite() {
            return Err(SolverError::NonFiniteCoefficient {
                name: name.to_string(),
            });
        }
        let terms = self.normalize_terms(expr, name)?;
        let id = ConstrId(self.rows.len());
        self.rows.push(Row {
            name: name.to_string(),
            terms,
            sense,
            rhs,
            state: RowState::Pending,
        });
        Ok(id)
    }

    fn remove_constraint(&mut self, constr: ConstrId) -> Result<(), SolverError> {
        let unknown = SolverError::UnknownConstraint { index: constr.0 };
        let row = self.rows.get(constr.0).ok_or(unknown.clone())?;
        if row.state == RowState::Removed || self.pending_removals.contains(&constr.0) {
            return Err(unknown);
        }
        self.pending_removals.push(constr.0);
        Ok(())
    }

    fn update(&mut self) -> Result<(), SolverError> {
        for row in self.rows.iter_mut() {
            if row.state == RowState::Pending {
                row.state = RowState::Active;
            }
        }
        for idx in self.pending_removals.drain(..) {
            self.rows[idx].state = RowState::Removed;
        }
        Ok(())
    }

    fn optimize(&mut self) -> Result<BackendStatus, SolverError> {
        self.update()?;

        let rows: Vec<CompiledRow> = self
            .rows
            .iter()
            .filter(|r| r.state == RowState::Active)
            .map(|r| CompiledRow {
                terms: r.terms.clone(),
                sense: r.sense,
                rhs: r.rhs,
            })
            .collect();

        log::debug!(
            "Optimizing model '{}': {} variables, {} constraints",
            self.name,
            self.objective.len(),
            rows.len()
        );

        let outcome = Search::new(&self.objective, rows, &self.config).run();
        self.stats = outcome.stats;

        match outcome.best {
            Some((objective, values)) => {
                self.solution = Some(DVector::from_iterator(
                    values.len(),
                    values.iter().map(|&v| f64::from(v)),
                ));
                self.objective_value = Some(objective);
            }
            None => {
                self.solution = None;
                self.objective_value = None;
            }
        }

        log::debug!(
            "Model '{}' finished with {:?} after {} nodes ({:.3}s)",
            self.name,
            outcome.status,
            outcome.stats.nodes,
            outcome.stats.elapsed.as_secs_f64()
        );

        Ok(outcome.status)
    }

    fn value(&self, var: VarId) -> Result<f64, SolverError> {
        if var.0 >= self.objective.len() {
            return Err(SolverError::UnknownVariable { index: var.0 });
        }
        let solution = self.solution.as_ref().ok_or(SolverError::NoSolution)?;
        // variables added after the last optimize have no value yet
        solution.get(var.0).copied().ok_or(SolverError::NoSolution)
    }

    fn objective_coefficient(&self, var: VarId) -> Result<f64, SolverError> {
        self.objective
            .get(var.0)
            .copied()
            .ok_or(SolverError::UnknownVariable { index: var.0 })
    }

    fn set_objective_coefficient(&mut self, var: VarId, objective: f64) -> Result<(), SolverError> {
        let name = self
            .var_names
            .get(var.0)
            .ok_or(SolverError::UnknownVariable { index: var.0 })?;
        if !objective.is_finite() {
            return Err(SolverError::NonFiniteCoefficient { name: name.clone() });
        }
        self.objective[var.0] = objective;
        Ok(())
    }

    fn objective_value(&self) -> Result<f64, SolverError> {
        self.objective_value.ok_or(SolverError::NoSolution)
    }

    fn var_name(&self, var: VarId) -> Result<&str, SolverError> {
        self.var_names
            .get(var.0)
            .map(String::as_str)
            .ok_or(SolverError::UnknownVariable { index: var.0 })
    }

    fn num_vars(&self) -> usize {
        self.objective.len()
    }

    fn num_constraints(&self) -> usize {
        self.rows
            .iter()
            .enumerate()
            .filter(|(i, r)| r.state != RowState::Removed && !self.pending_removals.contains(i))
            .count()
    }

    fn constraint_rows(&self) -> Vec<ConstraintRow> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(i, r)| r.state != RowState::Removed && !self.pending_removals.contains(i))
            .map(|(_, r)| ConstraintRow {
                name: r.name.clone(),
                expr: r.terms.iter().map(|&(j, c)| (VarId(j), c)).collect(),
                sense: r.sense,
                rhs: r.rhs,
            })
            .collect()
    }
}

// ============================================================================
// Search
// ============================================================================

#[derive(Debug, Clone)]
struct CompiledRow {
    terms: Vec<(usize, f64)>,
    sense: Sense,
    rhs: f64,
}

struct Decision {
    trail_mark: usize,
    var: usize,
    alternative: Option<i8>,
}

struct SearchOutcome {
    status: BackendStatus,
    best: Option<(f64, Vec<i8>)>,
    stats: SearchStats,
}

struct Search<'a> {
    objective: &'a [f64],
    rows: Vec<CompiledRow>,
    var_rows: Vec<Vec<usize>>,
    group_of: Vec<Option<usize>>,
    group_best: Vec<f64>,
    order: Vec<usize>,
    values: Vec<i8>,
    trail: Vec<usize>,
    fixed_cost: f64,
    queue: VecDeque<usize>,
    queued: Vec<bool>,
    tol: f64,
    node_limit: Option<u64>,
    time_limit: Option<Duration>,
}

impl<'a> Search<'a> {
    fn new(objective: &'a [f64], rows: Vec<CompiledRow>, config: &SolverConfig) -> Self {
        let n = objective.len();
        let tol = config.tolerance;

        let mut var_rows = vec![Vec::new(); n];
        for (r, row) in rows.iter().enumerate() {
            for &(j, _) in &row.terms {
                var_rows[j].push(r);
            }
        }

        // Set-packing rows: unit coefficients and rhs below 2, so at most one
        // of their variables can be 1. Each variable joins its first such row.
        let mut group_of = vec![None; n];
        let mut num_groups = 0;
        for row in &rows {
            let packing = row.sense == Sense::LessEqual
                && row.rhs < 2.0 - tol
                && row.terms.len() > 1
                && row.terms.iter().all(|&(_, c)| (c - 1.0).abs() <= tol);
            if !packing {
                continue;
            }
            let group = num_groups;
            let mut used = false;
            for &(j, _) in &row.terms {
                if group_of[j].is_none() {
                    group_of[j] = Some(group);
                    used = true;
                }
            }
            if used {
                num_groups += 1;
            }
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&x, &y| objective[x].total_cmp(&objective[y]).then(x.cmp(&y)));

        let time_limit = config
            .time_limit_secs
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(Duration::from_secs_f64);

        let num_rows = rows.len();
        Self {
            objective,
            rows,
            var_rows,
            group_of,
            group_best: vec![0.0; num_groups],
            order,
            values: vec![FREE; n],
            trail: Vec::with_capacity(n),
            fixed_cost: 0.0,
            queue: VecDeque::with_capacity(num_rows),
            queued: vec![false; num_rows],
            tol,
            node_limit: config.node_limit,
            time_limit,
        }
    }

    fn run(mut self) -> SearchOutcome {
        let start = Instant::now();
        let mut stats = SearchStats::default();
        let mut best: Option<(f64, Vec<i8>)> = None;
        let mut limit_status = None;

        for r in 0..self.rows.len() {
            self.enqueue(r);
        }
        if !self.propagate() {
            stats.elapsed = start.elapsed();
            return SearchOutcome {
                status: BackendStatus::Infeasible,
                best: None,
                stats,
            };
        }

        let mut stack: Vec<Decision> = Vec::new();

        'search: loop {
            stats.nodes += 1;
            if let Some(limit) = self.node_limit {
                if stats.nodes > limit {
                    limit_status = Some(BackendStatus::NodeLimit);
                    break 'search;
                }
            }
            if let Some(limit) = self.time_limit {
                if stats.nodes % TIME_CHECK_INTERVAL == 0 && start.elapsed() > limit {
                    limit_status = Some(BackendStatus::TimeLimit);
                    break 'search;
                }
            }

            let incumbent = best.as_ref().map_or(f64::INFINITY, |(obj, _)| *obj);
            let backtrack = if self.lower_bound() >= incumbent - self.tol {
                true
            } else {
                match self.next_free_var() {
                    None => {
                        let objective = self.exact_objective();
                        if objective < incumbent - self.tol {
                            log::trace!("New incumbent {:.6} at node {}", objective, stats.nodes);
                            stats.incumbents += 1;
                            best = Some((objective, self.values.clone()));
                        }
                        true
                    }
                    Some(j) => {
                        let first: i8 = if self.objective[j] < 0.0 { 1 } else { 0 };
                        stack.push(Decision {
                            trail_mark: self.trail.len(),
                            var: j,
                            alternative: Some(1 - first),
                        });
                        !self.assign(j, first)
                    }
                }
            };

            if backtrack {
                loop {
                    let Some(decision) = stack.last_mut() else {
                        break 'search;
                    };
                    let mark = decision.trail_mark;
                    let var = decision.var;
                    let alternative = decision.alternative.take();
                    self.undo(mark);
                    match alternative {
                        Some(value) => {
                            if self.assign(var, value) {
                                continue 'search;
                            }
                        }
                        None => {
                            stack.pop();
                        }
                    }
                }
            }
        }

        stats.elapsed = start.elapsed();

        let status = match (limit_status, &best) {
            (None, Some((obj, _))) if !obj.is_finite() => BackendStatus::Numeric,
            (None, Some(_)) => BackendStatus::Optimal,
            (None, None) => BackendStatus::Infeasible,
            (Some(_), Some(_)) => BackendStatus::Suboptimal,
            (Some(limit), None) => limit,
        };

        SearchOutcome { status, best, stats }
    }

    fn next_free_var(&self) -> Option<usize> {
        self.order.iter().copied().find(|&j| self.values[j] == FREE)
    }

    fn exact_objective(&self) -> f64 {
        self.values
            .iter()
            .zip(self.objective)
            .filter(|(&v, _)| v == 1)
            .map(|(_, &c)| c)
            .sum()
    }

    fn lower_bound(&mut self) -> f64 {
        let mut bound = self.fixed_cost;
        self.group_best.fill(0.0);
        for (j, &c) in self.objective.iter().enumerate() {
            if self.values[j] != FREE || c >= 0.0 {
                continue;
            }
            match self.group_of[j] {
                Some(g) => {
                    if c < self.group_best[g] {
                        self.group_best[g] = c;
                    }
                }
                None => bound += c,
            }
        }
        bound + self.group_best.iter().sum::<f64>()
    }

    fn assign(&mut self, var: usize, value: i8) -> bool {
        self.fix(var, value);
        self.propagate()
    }

    fn fix(&mut self, var: usize, value: i8) {
        self.values[var] = value;
        self.trail.push(var);
        if value == 1 {
            self.fixed_cost += self.objective[var];
        }
        for k in 0..self.var_rows[var].len() {
            let r = self.var_rows[var][k];
            self.enqueue(r);
        }
    }

    fn undo(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some(var) = self.trail.pop() {
                if self.values[var] == 1 {
                    self.fixed_cost -= self.objective[var];
                }
                self.values[var] = FREE;
            }
        }
    }

    fn enqueue(&mut self, row: usize) {
        if !self.queued[row] {
            self.queued[row] = true;
            self.queue.push_back(row);
        }
    }

    fn propagate(&mut self) -> bool {
        while let Some(r) = self.queue.pop_front() {
            self.queued[r] = false;
            if !self.propagate_row(r) {
                for q in self.queue.drain(..) {
                    self.queued[q] = false;
                }
                return false;
            }
        }
        true
    }

    /// Minimum and maximum activity of a row under the current partial assignment
    fn activity(&self, r: usize) -> (f64, f64) {
        let mut min = 0.0;
        let mut max = 0.0;
        for &(j, a) in &self.rows[r].terms {
            match self.values[j] {
                1 => {
                    min += a;
                    max += a;
                }
                0 => {}
                _ => {
                    if a < 0.0 {
                        min += a;
                    } else {
                        max += a;
                    }
                }
            }
        }
        (min, max)
    }

    fn propagate_row(&mut self, r: usize) -> bool {
        let (min_act, max_act) = self.activity(r);
        let sense = self.rows[r].sense;
        let rhs = self.rows[r].rhs;

        if sense.has_upper() && min_act > rhs + self.tol {
            return false;
        }
        if sense.has_lower() && max_act < rhs - self.tol {
            return false;
        }

        // Fixing with stale activities is conservative; the row is requeued
        // by every fix and rechecked with fresh activities.
        for k in 0..self.rows[r].terms.len() {
            let (j, a) = self.rows[r].terms[k];
            if self.values[j] != FREE {
                continue;
            }
            if sense.has_upper() && min_act + a.abs() > rhs + self.tol {
                self.fix(j, if a > 0.0 { 0 } else { 1 });
            } else if sense.has_lower() && max_act - a.abs() < rhs - self.tol {
                self.fix(j, if a > 0.0 { 1 } else { 0 });
            }
        }
        true
    }
}
