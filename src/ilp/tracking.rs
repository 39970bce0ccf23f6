//! Construction, solving and querying of the tracking ILP
//!
//! Build order (see [`GrowthLineTrackingIlp::build`]):
//!
//! 1. one hypothesis per region of every frame
//! 2. exit, mapping and division assignments for every `t < T-1`
//! 3. exit constraints
//! 4. path-blocking constraints for every frame
//! 5. explanation-continuity constraints for interior frames
//!
//! Construction is all-or-nothing: any error aborts and the partially built
//! model is dropped by the caller.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::RangeInclusive;
use std::path::Path;

use nalgebra::DVector;

use super::assignment::{Assignment, AssignmentEdge, AssignmentId, AssignmentKind, GroundTruth};
use super::costs::{division_cost, is_compatible, mapping_cost, segment_cost};
use super::hypothesis::{Hypothesis, HypothesisId};
use super::ledger::AssignmentsAndHypotheses;
use super::neighborhoods::HypothesisNeighborhoods;
use super::IlpStatus;
use crate::config::{ConstraintCounts, ModelSnapshot, TimeStepSnapshot, TrackingConfig};
use crate::errors::TrackingError;
use crate::growth_line::GrowthLineFrame;
use crate::reporter::{BuildReporter, ConstraintFamily};
use crate::solver::{write_lp, IlpModel, LinExpr, Sense, SolverEnvironment, VarId};
use crate::tree::utils::{ancestors_inclusive, leaves_in_order, node_interval, post_order, right_neighbors};
use crate::tree::{RegionKey, RegionTree};

/// Tracking ILP of one growth line
///
/// Owns the solver model, the hypothesis/assignment ledger and the
/// neighbourhood index. Created once, solved with [`run`](Self::run) and
/// re-solved in place after ground-truth edits.
#[derive(Debug)]
pub struct GrowthLineTrackingIlp<M: IlpModel> {
    model: M,
    backend: &'static str,
    config: TrackingConfig,
    ledger: AssignmentsAndHypotheses,
    neighborhoods: HypothesisNeighborhoods,
    time_steps: usize,
    status: IlpStatus,
    stale: bool,
    constraints: ConstraintCounts,
}

impl<M: IlpModel> GrowthLineTrackingIlp<M> {
    /// Wrap an empty model for a growth line with `time_steps` frames
    pub fn new(model: M, backend: &'static str, time_steps: usize, config: TrackingConfig) -> Self {
        let mut ledger = AssignmentsAndHypotheses::new();
        if time_steps > 0 {
            ledger.ensure_time(time_steps - 1);
        }
        Self {
            model,
            backend,
            config,
            ledger,
            neighborhoods: HypothesisNeighborhoods::new(),
            time_steps,
            status: IlpStatus::NeverRun,
            stale: false,
            constraints: ConstraintCounts::default(),
        }
    }

    /// Build the complete model for the given frames
    pub fn build<E, T, R>(
        env: &E,
        frames: &[GrowthLineFrame<T>],
        config: &TrackingConfig,
        reporter: &mut R,
    ) -> Result<Self, TrackingError>
    where
        E: SolverEnvironment<Model = M>,
        T: RegionTree,
        R: BuildReporter + ?Sized,
    {
        config.validate()?;
        let model = env
            .new_model("growth_line_tracking")
            .map_err(|e| TrackingError::solver("creating model", e))?;
        let mut ilp = Self::new(model, env.name(), frames.len(), config.clone());

        log::info!(
            "Building tracking ILP over {} frames ({} back end)",
            frames.len(),
            env.name()
        );

        for (t, frame) in frames.iter().enumerate() {
            let ids = ilp.ingest_frame(t, frame.tree(), frame.gap_separation())?;
            reporter.on_hypotheses(t, ids.len());
        }

        for t in 0..frames.len().saturating_sub(1) {
            let exits = ilp.add_exit_assignments(t)?;
            reporter.on_assignments(t, AssignmentKind::Exit, exits);
            let mappings = ilp.add_mapping_assignments(t)?;
            reporter.on_assignments(t, AssignmentKind::Mapping, mappings);
            let divisions = ilp.add_division_assignments(t, frames[t + 1].tree())?;
            reporter.on_assignments(t, AssignmentKind::Division, divisions);
            log::debug!(
                "t={}: {} exits, {} mappings, {} divisions",
                t,
                exits,
                mappings,
                divisions
            );
        }

        let exits = ilp.add_assignment_constraints()?;
        reporter.on_constraints(ConstraintFamily::Exit, exits);

        let mut blocking = 0;
        for (t, frame) in frames.iter().enumerate() {
            blocking += ilp.add_path_blocking_constraints(t, frame.tree())?;
        }
        reporter.on_constraints(ConstraintFamily::PathBlocking, blocking);

        let continuity = ilp.add_explanation_continuity_constraints()?;
        reporter.on_constraints(ConstraintFamily::Continuity, continuity);

        ilp.model
            .update()
            .map_err(|e| TrackingError::solver("committing model", e))?;

        log::info!(
            "Tracking ILP built: {} hypotheses, {} assignments, {} constraints",
            ilp.ledger.num_hypotheses(),
            ilp.ledger.num_assignments(),
            ilp.constraints.total()
        );
        Ok(ilp)
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Create one hypothesis per region of the frame at time `t`
    ///
    /// Regions are visited in post-order, children before their parent.
    pub fn ingest_frame<T: RegionTree + ?Sized>(
        &mut self,
        t: usize,
        tree: &T,
        gap_separation: &DVector<f64>,
    ) -> Result<Vec<HypothesisId>, TrackingError> {
        self.ledger.ensure_time(t);
        self.time_steps = self.time_steps.max(t + 1);

        let mut ids = Vec::new();
        for node in post_order(tree) {
            let region = RegionKey::new(t, node);
            let interval =
                node_interval(tree, node).ok_or(TrackingError::EmptyRegion { region })?;
            let cost = segment_cost(gap_separation, interval).ok_or(
                TrackingError::SignalTooShort {
                    time: t,
                    required: interval.b + 1,
                    actual: gap_separation.len(),
                },
            )?;
            let hypothesis =
                Hypothesis::new(region, interval, tree.size(node), tree.value(node), cost);
            ids.push(self.ledger.add_hypothesis(hypothesis));
        }

        log::trace!("t={}: ingested {} hypotheses", t, ids.len());
        Ok(ids)
    }

    /// Add one zero-cost exit per hypothesis at `t`
    pub fn add_exit_assignments(&mut self, t: usize) -> Result<usize, TrackingError> {
        self.check_time(t)?;
        let current = self.hypotheses_cloned(t);

        for (who, hypothesis) in &current {
            let hup: Vec<HypothesisId> = current
                .iter()
                .filter(|(_, other)| other.interval().is_above(&hypothesis.interval()))
                .map(|(id, _)| *id)
                .collect();
            let var = self
                .model
                .add_binary_var(0.0, &format!("exit_t{}_h{}", t, who.0))
                .map_err(|e| TrackingError::solver("adding exit variable", e))?;
            self.push_assignment(t, var, AssignmentEdge::Exit { who: *who, hup });
        }
        Ok(current.len())
    }

    /// Add a mapping for every compatible pair between `t` and `t+1`
    pub fn add_mapping_assignments(&mut self, t: usize) -> Result<usize, TrackingError> {
        self.check_time(t + 1)?;
        let current = self.hypotheses_cloned(t);
        let next = self.hypotheses_cloned(t + 1);

        let mut added = 0;
        for (from, from_h) in &current {
            for (to, to_h) in &next {
                if !is_compatible(from_h, to_h) {
                    continue;
                }
                let cost = mapping_cost(from_h, to_h);
                if !self.config.admits(cost) {
                    continue;
                }
                let var = self
                    .model
                    .add_binary_var(cost, &format!("map_t{}_{}_{}", t, from.0, to.0))
                    .map_err(|e| TrackingError::solver("adding mapping variable", e))?;
                self.push_assignment(t, var, AssignmentEdge::Mapping { from: *from, to: *to });
                added += 1;
            }
        }
        Ok(added)
    }

    /// Add a division for every compatible pair and every right neighbour
    /// of the upper daughter in the next frame's tree
    pub fn add_division_assignments<T: RegionTree + ?Sized>(
        &mut self,
        t: usize,
        next_tree: &T,
    ) -> Result<usize, TrackingError> {
        self.check_time(t + 1)?;
        let current = self.hypotheses_cloned(t);
        let next = self.hypotheses_cloned(t + 1);

        let mut added = 0;
        for (from, from_h) in &current {
            for (upper, upper_h) in &next {
                if !is_compatible(from_h, upper_h) {
                    continue;
                }
                for neighbor in right_neighbors(next_tree, upper_h.region().node) {
                    let region = RegionKey::new(t + 1, neighbor);
                    let lower = self.ledger.find_hypothesis(region).ok_or_else(|| {
                        TrackingError::MissingHypothesis {
                            region,
                            context: "resolving lower division partner".to_string(),
                        }
                    })?;
                    let lower_h = self.hypothesis_or_err(lower, region)?;

                    let cost = division_cost(from_h, upper_h, lower_h);
                    if !self.config.admits(cost) {
                        continue;
                    }
                    let var = self
                        .model
                        .add_binary_var(
                            cost,
                            &format!("div_t{}_{}_{}_{}", t, from.0, upper.0, lower.0),
                        )
                        .map_err(|e| TrackingError::solver("adding division variable", e))?;
                    self.push_assignment(
                        t,
                        var,
                        AssignmentEdge::Division {
                            from: *from,
                            to_upper: *upper,
                            to_lower: lower,
                        },
                    );
                    added += 1;
                }
            }
        }
        Ok(added)
    }

    /// Add the constraints owned by individual assignments
    pub fn add_assignment_constraints(&mut self) -> Result<usize, TrackingError> {
        let mut added = 0;
        for assignment in self.ledger.assignments() {
            let Some(constraint) = assignment.structural_constraint(&self.ledger, &self.neighborhoods)
            else {
                continue;
            };
            let name = format!("exit_{}_{}", assignment.time(), assignment.edge().source().0);
            self.model
                .add_constraint(&constraint.expr, constraint.sense, constraint.rhs, &name)
                .map_err(|e| TrackingError::solver("adding exit constraint", e))?;
            added += 1;
        }
        self.constraints.exit += added;
        log::trace!("Added {} exit constraints", added);
        Ok(added)
    }

    /// At most one assignment per leaf-to-root chain of the frame at `t`
    ///
    /// Outgoing assignments are summed, except at the last frame where the
    /// incoming ones are.
    pub fn add_path_blocking_constraints<T: RegionTree + ?Sized>(
        &mut self,
        t: usize,
        tree: &T,
    ) -> Result<usize, TrackingError> {
        self.check_time(t)?;
        let last_frame = t + 1 == self.time_steps;

        let mut added = 0;
        for (k, leaf) in leaves_in_order(tree).into_iter().enumerate() {
            let mut expr = LinExpr::new();
            for node in ancestors_inclusive(tree, leaf) {
                let region = RegionKey::new(t, node);
                let hypothesis = self.ledger.find_hypothesis(region).ok_or_else(|| {
                    TrackingError::MissingHypothesis {
                        region,
                        context: "building path-blocking constraint".to_string(),
                    }
                })?;
                let set = if last_frame {
                    self.neighborhoods.left(hypothesis)
                } else {
                    self.neighborhoods.right(hypothesis)
                };
                for &id in set {
                    if let Some(assignment) = self.ledger.assignment(id) {
                        expr.add_term(1.0, assignment.var());
                    }
                }
            }
            if expr.is_empty() {
                continue;
            }
            self.model
                .add_constraint(&expr, Sense::LessEqual, 1.0, &format!("pbc_{}_{}", t, k))
                .map_err(|e| TrackingError::solver("adding path-blocking constraint", e))?;
            added += 1;
        }
        self.constraints.path_blocking += added;
        log::trace!("t={}: added {} path-blocking constraints", t, added);
        Ok(added)
    }

    /// Incoming equals outgoing at every hypothesis of the interior frames
    pub fn add_explanation_continuity_constraints(&mut self) -> Result<usize, TrackingError> {
        let mut added = 0;
        for t in 1..self.time_steps.saturating_sub(1) {
            for &h in self.ledger.hypotheses_at(t) {
                let left = self.neighborhoods.left(h);
                let right = self.neighborhoods.right(h);
                if left.is_empty() && right.is_empty() {
                    continue;
                }

                let mut expr = LinExpr::new();
                for &id in left {
                    if let Some(a) = self.ledger.assignment(id) {
                        expr.add_term(1.0, a.var());
                    }
                }
                for &id in right {
                    if let Some(a) = self.ledger.assignment(id) {
                        expr.add_term(-1.0, a.var());
                    }
                }
                self.model
                    .add_constraint(&expr, Sense::Equal, 0.0, &format!("ecc_{}_{}", t, h.0))
                    .map_err(|e| TrackingError::solver("adding continuity constraint", e))?;
                added += 1;
            }
        }
        self.constraints.continuity += added;
        log::trace!("Added {} continuity constraints", added);
        Ok(added)
    }

    fn push_assignment(&mut self, t: usize, var: VarId, edge: AssignmentEdge) -> AssignmentId {
        let id = self.ledger.add_assignment(t, var, edge);
        if let Some(assignment) = self.ledger.assignment(id) {
            self.neighborhoods.register(id, assignment.edge());
        }
        id
    }

    fn hypotheses_cloned(&self, t: usize) -> Vec<(HypothesisId, Hypothesis)> {
        self.ledger
            .hypotheses_at(t)
            .iter()
            .filter_map(|&id| self.ledger.hypothesis(id).map(|h| (id, h.clone())))
            .collect()
    }

    fn hypothesis_or_err(
        &self,
        id: HypothesisId,
        region: RegionKey,
    ) -> Result<&Hypothesis, TrackingError> {
        self.ledger
            .hypothesis(id)
            .ok_or_else(|| TrackingError::MissingHypothesis {
                region,
                context: "reading hypothesis".to_string(),
            })
    }

    // ========================================================================
    // Solving
    // ========================================================================

    /// Optimize and record the status
    pub fn run(&mut self) -> Result<IlpStatus, TrackingError> {
        let backend_status = self
            .model
            .optimize()
            .map_err(|e| TrackingError::solver("optimizing tracking model", e))?;
        self.status = IlpStatus::from(backend_status);
        self.stale = false;

        match self.model.objective_value() {
            Ok(obj) if self.status.has_solution() => {
                log::info!("Tracking ILP solved: {} (objective {:.6})", self.status, obj)
            }
            _ => log::info!("Tracking ILP solved: {}", self.status),
        }
        Ok(self.status)
    }

    /// Re-optimize after ground-truth edits
    pub fn resolve(&mut self) -> Result<IlpStatus, TrackingError> {
        log::debug!(
            "Re-solving with {} pinned assignments",
            self.constraints.pins
        );
        self.run()
    }

    /// Status of the last solve
    pub fn status(&self) -> IlpStatus {
        self.status
    }

    /// True if pins or costs changed after the last solve
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    // ========================================================================
    // Queries
    // ========================================================================

    fn ensure_solution(&self) -> Result<(), TrackingError> {
        if !self.status.has_solution() {
            return Err(TrackingError::NoSolution {
                status: self.status,
            });
        }
        if self.stale {
            return Err(TrackingError::StaleSolution);
        }
        Ok(())
    }

    fn check_time(&self, t: usize) -> Result<(), TrackingError> {
        if t >= self.time_steps {
            return Err(TrackingError::TimeOutOfRange {
                time: t,
                steps: self.time_steps,
            });
        }
        Ok(())
    }

    fn assignment_or_err(&self, id: AssignmentId) -> Result<&Assignment, TrackingError> {
        self.ledger
            .assignment(id)
            .ok_or(TrackingError::UnknownAssignment(id))
    }

    /// True if the assignment is active in the current solution
    pub fn is_assignment_active(&self, id: AssignmentId) -> Result<bool, TrackingError> {
        self.ensure_solution()?;
        self.assignment_or_err(id)?
            .is_active(&self.model)
            .map_err(|e| TrackingError::solver("reading assignment value", e))
    }

    /// First assignment of `set` whose variable is 1
    pub fn find_active_assignment<'a, I>(&self, set: I) -> Result<Option<AssignmentId>, TrackingError>
    where
        I: IntoIterator<Item = &'a AssignmentId>,
    {
        self.ensure_solution()?;
        for &id in set {
            if self.is_assignment_active(id)? {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    /// Hypotheses at `t` that are part of the optimal tracking
    ///
    /// A hypothesis is chosen if an assignment ending in it is active, or at
    /// `t = 0` an assignment starting in it.
    pub fn optimal_segmentation(&self, t: usize) -> Result<Vec<HypothesisId>, TrackingError> {
        self.ensure_solution()?;
        self.check_time(t)?;

        let mut chosen = Vec::new();
        for &h in self.ledger.hypotheses_at(t) {
            let set = if t > 0 {
                self.neighborhoods.left(h)
            } else {
                self.neighborhoods.right(h)
            };
            if self.find_active_assignment(set)?.is_some() {
                chosen.push(h);
            }
        }
        Ok(chosen)
    }

    /// Same as [`optimal_segmentation`](Self::optimal_segmentation), resolved
    /// to the hypotheses themselves
    pub fn optimal_hypotheses(&self, t: usize) -> Result<Vec<&Hypothesis>, TrackingError> {
        Ok(self
            .optimal_segmentation(t)?
            .into_iter()
            .filter_map(|id| self.ledger.hypothesis(id))
            .collect())
    }

    /// Active incoming assignment per hypothesis at `t`
    pub fn optimal_left_assignments(
        &self,
        t: usize,
    ) -> Result<Vec<(HypothesisId, AssignmentId)>, TrackingError> {
        self.optimal_assignments(t, true)
    }

    /// Active outgoing assignment per hypothesis at `t`
    pub fn optimal_right_assignments(
        &self,
        t: usize,
    ) -> Result<Vec<(HypothesisId, AssignmentId)>, TrackingError> {
        self.optimal_assignments(t, false)
    }

    fn optimal_assignments(
        &self,
        t: usize,
        left: bool,
    ) -> Result<Vec<(HypothesisId, AssignmentId)>, TrackingError> {
        self.ensure_solution()?;
        self.check_time(t)?;

        let mut result = Vec::new();
        for &h in self.ledger.hypotheses_at(t) {
            let set = if left {
                self.neighborhoods.left(h)
            } else {
                self.neighborhoods.right(h)
            };
            if let Some(a) = self.find_active_assignment(set)? {
                result.push((h, a));
            }
        }
        Ok(result)
    }

    /// Every outgoing assignment per hypothesis at `t`, solved or not
    pub fn right_assignments_at(
        &self,
        t: usize,
    ) -> Result<Vec<(HypothesisId, Vec<AssignmentId>)>, TrackingError> {
        self.check_time(t)?;
        Ok(self
            .ledger
            .hypotheses_at(t)
            .iter()
            .map(|&h| (h, self.neighborhoods.right(h).iter().copied().collect()))
            .collect())
    }

    /// Assignments leaving `t`, optionally of one kind, with cost in `costs`
    pub fn assignments_at(
        &self,
        t: usize,
        kind: Option<AssignmentKind>,
        costs: RangeInclusive<f64>,
    ) -> Result<Vec<AssignmentId>, TrackingError> {
        self.check_time(t)?;
        let mut result = Vec::new();
        for &id in self.ledger.assignments_at(t) {
            let assignment = self.assignment_or_err(id)?;
            if kind.map_or(false, |k| k != assignment.kind()) {
                continue;
            }
            let cost = assignment
                .cost(&self.model)
                .map_err(|e| TrackingError::solver("reading assignment cost", e))?;
            if costs.contains(&cost) {
                result.push(id);
            }
        }
        Ok(result)
    }

    /// Every active assignment leaving `t`
    pub fn active_assignments_at(&self, t: usize) -> Result<Vec<AssignmentId>, TrackingError> {
        self.ensure_solution()?;
        self.check_time(t)?;
        let mut active = Vec::new();
        for &id in self.ledger.assignments_at(t) {
            if self.is_assignment_active(id)? {
                active.push(id);
            }
        }
        Ok(active)
    }

    /// Cost of an assignment, read back from the solver
    pub fn assignment_cost(&self, id: AssignmentId) -> Result<f64, TrackingError> {
        self.assignment_or_err(id)?
            .cost(&self.model)
            .map_err(|e| TrackingError::solver("reading assignment cost", e))
    }

    /// Objective value of the current solution
    pub fn objective_value(&self) -> Result<f64, TrackingError> {
        self.ensure_solution()?;
        self.model
            .objective_value()
            .map_err(|e| TrackingError::solver("reading objective value", e))
    }

    /// Replace the cost of an assignment
    ///
    /// Like a pin, the change takes effect on the next
    /// [`resolve`](Self::resolve); until then queries report
    /// [`TrackingError::StaleSolution`].
    pub fn set_assignment_cost(&mut self, id: AssignmentId, cost: f64) -> Result<(), TrackingError> {
        let assignment = self
            .ledger
            .assignment(id)
            .ok_or(TrackingError::UnknownAssignment(id))?;
        assignment
            .set_cost(&mut self.model, cost)
            .map_err(|e| TrackingError::solver("changing assignment cost", e))?;
        self.stale = true;
        log::debug!("Assignment {} cost set to {}", id, cost);
        Ok(())
    }

    // ========================================================================
    // Model export
    // ========================================================================

    /// Write the model (objective, live constraints, binaries) in LP format
    pub fn write_lp<W: Write>(&self, writer: W) -> Result<(), TrackingError> {
        write_lp(&self.model, "growth_line_tracking", writer).map_err(|e| TrackingError::Export {
            description: format!("writing LP model: {}", e),
        })
    }

    /// Write the model in LP format to a file
    pub fn write_lp_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TrackingError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| TrackingError::Export {
            description: format!("creating {}: {}", path.display(), e),
        })?;
        self.write_lp(BufWriter::new(file))?;
        log::debug!("Wrote LP model to {}", path.display());
        Ok(())
    }

    // ========================================================================
    // Ground-truth pins
    // ========================================================================

    /// Pin an assignment (or release it with [`GroundTruth::Unset`])
    ///
    /// Any previous pin is replaced. The model is not re-solved; queries
    /// report [`TrackingError::StaleSolution`] until [`resolve`](Self::resolve).
    pub fn apply_pin(&mut self, id: AssignmentId, state: GroundTruth) -> Result<(), TrackingError> {
        let (var, previous) = {
            let assignment = self.assignment_or_err(id)?;
            (assignment.var(), assignment.pin_constraint())
        };

        if let Some(constr) = previous {
            self.model
                .remove_constraint(constr)
                .map_err(|e| TrackingError::solver("removing ground-truth pin", e))?;
            self.constraints.pins -= 1;
        }

        let pin = match state.pinned_value() {
            Some(value) => {
                let name = format!(
                    "pin_{}",
                    self.model
                        .var_name(var)
                        .map_err(|e| TrackingError::solver("naming ground-truth pin", e))?
                );
                let constr = self
                    .model
                    .add_constraint(&LinExpr::new().with_term(1.0, var), Sense::Equal, value, &name)
                    .map_err(|e| TrackingError::solver("adding ground-truth pin", e))?;
                self.constraints.pins += 1;
                Some(constr)
            }
            None => None,
        };

        if let Some(assignment) = self.ledger.assignment_mut(id) {
            assignment.set_pin(state, pin);
        }
        self.stale = true;
        log::debug!("Assignment {} pinned to {:?}", id, state);
        Ok(())
    }

    /// Force an assignment to be active
    pub fn set_ground_truth(&mut self, id: AssignmentId) -> Result<(), TrackingError> {
        self.apply_pin(id, GroundTruth::ForcedTrue)
    }

    /// Force an assignment to be inactive
    pub fn set_ground_untruth(&mut self, id: AssignmentId) -> Result<(), TrackingError> {
        self.apply_pin(id, GroundTruth::ForcedFalse)
    }

    /// Release any pin on an assignment
    pub fn clear_ground_truth(&mut self, id: AssignmentId) -> Result<(), TrackingError> {
        self.apply_pin(id, GroundTruth::Unset)
    }

    /// Current pin of an assignment
    pub fn ground_truth(&self, id: AssignmentId) -> Result<GroundTruth, TrackingError> {
        Ok(self.assignment_or_err(id)?.ground_truth())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of frames
    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    /// Hypothesis by id
    pub fn hypothesis(&self, id: HypothesisId) -> Option<&Hypothesis> {
        self.ledger.hypothesis(id)
    }

    /// Assignment by id
    pub fn assignment(&self, id: AssignmentId) -> Option<&Assignment> {
        self.ledger.assignment(id)
    }

    /// Hypothesis and assignment storage
    pub fn ledger(&self) -> &AssignmentsAndHypotheses {
        &self.ledger
    }

    /// Left/right assignment sets
    pub fn neighborhoods(&self) -> &HypothesisNeighborhoods {
        &self.neighborhoods
    }

    /// Underlying solver model
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Configuration used to build the model
    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Constraints per family
    pub fn constraint_counts(&self) -> ConstraintCounts {
        self.constraints
    }

    /// Serializable summary of the model
    pub fn snapshot(&self) -> ModelSnapshot {
        let steps = (0..self.time_steps)
            .map(|t| TimeStepSnapshot {
                time: t,
                hypotheses: self.ledger.hypotheses_at(t).len(),
                exits: self.ledger.count_at(t, AssignmentKind::Exit),
                mappings: self.ledger.count_at(t, AssignmentKind::Mapping),
                divisions: self.ledger.count_at(t, AssignmentKind::Division),
            })
            .collect();
        ModelSnapshot {
            backend: self.backend.to_string(),
            time_steps: self.time_steps,
            steps,
            constraints: self.constraints,
            num_vars: self.model.num_vars(),
            status: self.status.to_string(),
            config: self.config.clone(),
        }
    }
}
