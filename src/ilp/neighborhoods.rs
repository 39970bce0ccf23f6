//! Left and right assignment sets of every hypothesis

use std::collections::{BTreeSet, HashMap};

use super::assignment::{AssignmentEdge, AssignmentId};
use super::hypothesis::HypothesisId;

static EMPTY: BTreeSet<AssignmentId> = BTreeSet::new();

/// Incidence index between hypotheses and assignments
///
/// The left set of `h` holds assignments ending in `h`, the right set those
/// starting in `h`. Sets are ordered by assignment id (creation order) and
/// never shrink.
#[derive(Debug, Clone, Default)]
pub struct HypothesisNeighborhoods {
    left: HashMap<HypothesisId, BTreeSet<AssignmentId>>,
    right: HashMap<HypothesisId, BTreeSet<AssignmentId>>,
}

impl HypothesisNeighborhoods {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `assignment` as ending in `hypothesis`
    pub fn add_to_left(&mut self, hypothesis: HypothesisId, assignment: AssignmentId) {
        self.left.entry(hypothesis).or_default().insert(assignment);
    }

    /// Record `assignment` as starting in `hypothesis`
    pub fn add_to_right(&mut self, hypothesis: HypothesisId, assignment: AssignmentId) {
        self.right.entry(hypothesis).or_default().insert(assignment);
    }

    /// Register an assignment with its source and all its destinations
    pub fn register(&mut self, assignment: AssignmentId, edge: &AssignmentEdge) {
        self.add_to_right(edge.source(), assignment);
        for to in edge.destinations() {
            self.add_to_left(to, assignment);
        }
    }

    /// Assignments ending in `hypothesis`
    pub fn left(&self, hypothesis: HypothesisId) -> &BTreeSet<AssignmentId> {
        self.left.get(&hypothesis).unwrap_or(&EMPTY)
    }

    /// Assignments starting in `hypothesis`
    pub fn right(&self, hypothesis: HypothesisId) -> &BTreeSet<AssignmentId> {
        self.right.get(&hypothesis).unwrap_or(&EMPTY)
    }

    /// True if `hypothesis` has a left set
    pub fn has_left(&self, hypothesis: HypothesisId) -> bool {
        !self.left(hypothesis).is_empty()
    }

    /// True if `hypothesis` has a right set
    pub fn has_right(&self, hypothesis: HypothesisId) -> bool {
        !self.right(hypothesis).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_division() {
        let mut nbh = HypothesisNeighborhoods::new();
        let edge = AssignmentEdge::Division {
            from: HypothesisId(0),
            to_upper: HypothesisId(1),
            to_lower: HypothesisId(2),
        };
        nbh.register(AssignmentId(7), &edge);

        assert!(nbh.right(HypothesisId(0)).contains(&AssignmentId(7)));
        assert!(nbh.left(HypothesisId(1)).contains(&AssignmentId(7)));
        assert!(nbh.left(HypothesisId(2)).contains(&AssignmentId(7)));
        assert!(!nbh.has_left(HypothesisId(0)));
        assert!(!nbh.has_right(HypothesisId(1)));
    }

    #[test]
    fn test_sets_are_ordered_and_deduplicated() {
        let mut nbh = HypothesisNeighborhoods::new();
        nbh.add_to_right(HypothesisId(0), AssignmentId(5));
        nbh.add_to_right(HypothesisId(0), AssignmentId(2));
        nbh.add_to_right(HypothesisId(0), AssignmentId(5));
        let ids: Vec<_> = nbh.right(HypothesisId(0)).iter().copied().collect();
        assert_eq!(ids, vec![AssignmentId(2), AssignmentId(5)]);
        assert!(nbh.right(HypothesisId(9)).is_empty());
    }
}
