//! Storage of hypotheses and assignments per time step

use std::collections::HashMap;

use super::assignment::{Assignment, AssignmentEdge, AssignmentId, AssignmentKind};
use super::hypothesis::{Hypothesis, HypothesisId};
use crate::solver::VarId;
use crate::tree::RegionKey;

/// All hypotheses and assignments of one tracking ILP
///
/// Both are stored in arenas indexed by their ids, with per-time lists in
/// insertion order. A region-key map gives constant-time reverse lookup from
/// a tree node to its hypothesis.
#[derive(Debug, Clone, Default)]
pub struct AssignmentsAndHypotheses {
    hypotheses: Vec<Hypothesis>,
    hypotheses_by_time: Vec<Vec<HypothesisId>>,
    assignments: Vec<Assignment>,
    assignments_by_time: Vec<Vec<AssignmentId>>,
    by_region: HashMap<RegionKey, HypothesisId>,
}

impl AssignmentsAndHypotheses {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure lists exist for time steps `0..=t`
    pub fn ensure_time(&mut self, t: usize) {
        while self.hypotheses_by_time.len() <= t {
            self.hypotheses_by_time.push(Vec::new());
            self.assignments_by_time.push(Vec::new());
        }
    }

    /// Number of time steps with storage
    pub fn time_steps(&self) -> usize {
        self.hypotheses_by_time.len()
    }

    /// Store a hypothesis and register its region for reverse lookup
    pub fn add_hypothesis(&mut self, hypothesis: Hypothesis) -> HypothesisId {
        let id = HypothesisId(self.hypotheses.len());
        self.ensure_time(hypothesis.time());
        self.hypotheses_by_time[hypothesis.time()].push(id);
        self.by_region.insert(hypothesis.region(), id);
        self.hypotheses.push(hypothesis);
        id
    }

    /// Store an assignment leaving time `t`
    pub fn add_assignment(&mut self, t: usize, var: VarId, edge: AssignmentEdge) -> AssignmentId {
        let id = AssignmentId(self.assignments.len());
        self.ensure_time(t);
        self.assignments_by_time[t].push(id);
        self.assignments.push(Assignment::new(id, t, var, edge));
        id
    }

    /// Hypothesis by id
    pub fn hypothesis(&self, id: HypothesisId) -> Option<&Hypothesis> {
        self.hypotheses.get(id.0)
    }

    /// Hypothesis wrapping the given region
    pub fn find_hypothesis(&self, region: RegionKey) -> Option<HypothesisId> {
        self.by_region.get(&region).copied()
    }

    /// Hypotheses at time `t`, in ingestion order
    pub fn hypotheses_at(&self, t: usize) -> &[HypothesisId] {
        self.hypotheses_by_time
            .get(t)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Assignment by id
    pub fn assignment(&self, id: AssignmentId) -> Option<&Assignment> {
        self.assignments.get(id.0)
    }

    pub(crate) fn assignment_mut(&mut self, id: AssignmentId) -> Option<&mut Assignment> {
        self.assignments.get_mut(id.0)
    }

    /// Kind of an assignment
    pub fn kind_of(&self, id: AssignmentId) -> Option<AssignmentKind> {
        self.assignment(id).map(Assignment::kind)
    }

    /// Assignments leaving time `t`, in creation order
    pub fn assignments_at(&self, t: usize) -> &[AssignmentId] {
        self.assignments_by_time
            .get(t)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every assignment
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter()
    }

    /// Total hypotheses
    pub fn num_hypotheses(&self) -> usize {
        self.hypotheses.len()
    }

    /// Total assignments
    pub fn num_assignments(&self) -> usize {
        self.assignments.len()
    }

    /// Assignments of one kind leaving time `t`
    pub fn count_at(&self, t: usize, kind: AssignmentKind) -> usize {
        self.assignments_at(t)
            .iter()
            .filter(|&&a| self.kind_of(a) == Some(kind))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Interval, NodeId};

    fn hyp(t: usize, node: usize) -> Hypothesis {
        Hypothesis::new(RegionKey::new(t, NodeId(node)), Interval::new(0, 1), 2, 0.0, 0.0)
    }

    #[test]
    fn test_reverse_lookup() {
        let mut ledger = AssignmentsAndHypotheses::new();
        let h0 = ledger.add_hypothesis(hyp(0, 4));
        let h1 = ledger.add_hypothesis(hyp(2, 4));

        assert_eq!(ledger.find_hypothesis(RegionKey::new(0, NodeId(4))), Some(h0));
        assert_eq!(ledger.find_hypothesis(RegionKey::new(2, NodeId(4))), Some(h1));
        assert_eq!(ledger.find_hypothesis(RegionKey::new(1, NodeId(4))), None);
        assert_eq!(ledger.time_steps(), 3);
        assert!(ledger.hypotheses_at(1).is_empty());
        assert!(ledger.hypotheses_at(7).is_empty());
    }

    #[test]
    fn test_assignments_per_time() {
        let mut ledger = AssignmentsAndHypotheses::new();
        let h0 = ledger.add_hypothesis(hyp(0, 0));
        let h1 = ledger.add_hypothesis(hyp(1, 0));
        let exit = ledger.add_assignment(
            0,
            VarId(0),
            AssignmentEdge::Exit {
                who: h0,
                hup: Vec::new(),
            },
        );
        let map = ledger.add_assignment(0, VarId(1), AssignmentEdge::Mapping { from: h0, to: h1 });

        assert_eq!(ledger.assignments_at(0), &[exit, map]);
        assert_eq!(ledger.kind_of(map), Some(AssignmentKind::Mapping));
        assert_eq!(ledger.count_at(0, AssignmentKind::Exit), 1);
        assert_eq!(ledger.num_assignments(), 2);
        assert_eq!(ledger.assignment(map).map(|a| a.var()), Some(VarId(1)));
    }
}
