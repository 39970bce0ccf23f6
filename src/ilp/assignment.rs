//! Assignments: hyperedges between hypotheses of consecutive frames
//!
//! Every assignment owns exactly one binary variable whose objective
//! coefficient is the assignment's cost. The three variants form a closed
//! sum type, so constraint construction matches on [`AssignmentEdge`]
//! instead of inspecting type tags.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use super::hypothesis::HypothesisId;
use super::ledger::AssignmentsAndHypotheses;
use super::neighborhoods::HypothesisNeighborhoods;
use crate::errors::SolverError;
use crate::solver::{ConstrId, IlpModel, LinExpr, Sense, VarId};

/// Index of an assignment in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AssignmentId(pub usize);

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// Kind of an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentKind {
    /// Cell leaves the channel
    Exit,
    /// Cell continues as one region in the next frame
    Mapping,
    /// Cell divides into two adjacent regions in the next frame
    Division,
}

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentKind::Exit => write!(f, "exit"),
            AssignmentKind::Mapping => write!(f, "mapping"),
            AssignmentKind::Division => write!(f, "division"),
        }
    }
}

/// Endpoints of an assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentEdge {
    /// `who` exits; `hup` are the same-time hypotheses strictly above it
    Exit {
        /// Exiting hypothesis
        who: HypothesisId,
        /// Hypotheses above `who`
        hup: Vec<HypothesisId>,
    },
    /// `from` at t continues as `to` at t+1
    Mapping {
        /// Source at t
        from: HypothesisId,
        /// Destination at t+1
        to: HypothesisId,
    },
    /// `from` at t divides into `to_upper` and `to_lower` at t+1
    Division {
        /// Source at t
        from: HypothesisId,
        /// Upper daughter at t+1
        to_upper: HypothesisId,
        /// Lower daughter at t+1
        to_lower: HypothesisId,
    },
}

impl AssignmentEdge {
    /// Kind of this edge
    pub fn kind(&self) -> AssignmentKind {
        match self {
            AssignmentEdge::Exit { .. } => AssignmentKind::Exit,
            AssignmentEdge::Mapping { .. } => AssignmentKind::Mapping,
            AssignmentEdge::Division { .. } => AssignmentKind::Division,
        }
    }

    /// Source hypothesis at time t
    pub fn source(&self) -> HypothesisId {
        match *self {
            AssignmentEdge::Exit { who, .. } => who,
            AssignmentEdge::Mapping { from, .. } => from,
            AssignmentEdge::Division { from, .. } => from,
        }
    }

    /// Destination hypotheses at time t+1 (none for exits)
    pub fn destinations(&self) -> SmallVec<[HypothesisId; 2]> {
        match *self {
            AssignmentEdge::Exit { .. } => SmallVec::new(),
            AssignmentEdge::Mapping { to, .. } => smallvec![to],
            AssignmentEdge::Division {
                to_upper, to_lower, ..
            } => smallvec![to_upper, to_lower],
        }
    }

    /// Source followed by destinations
    pub fn endpoints(&self) -> SmallVec<[HypothesisId; 3]> {
        let mut endpoints: SmallVec<[HypothesisId; 3]> = smallvec![self.source()];
        endpoints.extend(self.destinations());
        endpoints
    }
}

/// Ground-truth pin of an assignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroundTruth {
    /// Solver decides freely
    #[default]
    Unset,
    /// Assignment must be active
    ForcedTrue,
    /// Assignment must be inactive
    ForcedFalse,
}

impl GroundTruth {
    /// Value the pin forces the variable to, if any
    pub fn pinned_value(self) -> Option<f64> {
        match self {
            GroundTruth::Unset => None,
            GroundTruth::ForcedTrue => Some(1.0),
            GroundTruth::ForcedFalse => Some(0.0),
        }
    }
}

/// Constraint an assignment contributes on its own
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralConstraint {
    /// Left-hand side
    pub expr: LinExpr,
    /// Comparison
    pub sense: Sense,
    /// Right-hand side
    pub rhs: f64,
}

/// One assignment, bound to its solver variable
#[derive(Debug, Clone)]
pub struct Assignment {
    id: AssignmentId,
    time: usize,
    var: VarId,
    edge: AssignmentEdge,
    ground_truth: GroundTruth,
    pin: Option<ConstrId>,
}

impl Assignment {
    /// Create an unpinned assignment
    pub fn new(id: AssignmentId, time: usize, var: VarId, edge: AssignmentEdge) -> Self {
        Self {
            id,
            time,
            var,
            edge,
            ground_truth: GroundTruth::Unset,
            pin: None,
        }
    }

    /// Ledger id
    #[inline]
    pub fn id(&self) -> AssignmentId {
        self.id
    }

    /// Time step of the source hypothesis
    #[inline]
    pub fn time(&self) -> usize {
        self.time
    }

    /// Bound solver variable
    #[inline]
    pub fn var(&self) -> VarId {
        self.var
    }

    /// Endpoints
    #[inline]
    pub fn edge(&self) -> &AssignmentEdge {
        &self.edge
    }

    /// Kind
    #[inline]
    pub fn kind(&self) -> AssignmentKind {
        self.edge.kind()
    }

    /// Source followed by destinations
    pub fn endpoints(&self) -> SmallVec<[HypothesisId; 3]> {
        self.edge.endpoints()
    }

    /// Cost, read back from the variable's objective coefficient
    pub fn cost<M: IlpModel + ?Sized>(&self, model: &M) -> Result<f64, SolverError> {
        model.objective_coefficient(self.var)
    }

    /// Overwrite the variable's objective coefficient
    pub fn set_cost<M: IlpModel + ?Sized>(&self, model: &mut M, cost: f64) -> Result<(), SolverError> {
        model.set_objective_coefficient(self.var, cost)
    }

    /// True if the variable is 1 in the model's last solution
    pub fn is_active<M: IlpModel + ?Sized>(&self, model: &M) -> Result<bool, SolverError> {
        Ok(model.value(self.var)? > 0.5)
    }

    /// Current pin
    #[inline]
    pub fn ground_truth(&self) -> GroundTruth {
        self.ground_truth
    }

    /// Handle of the pin constraint, if pinned
    #[inline]
    pub fn pin_constraint(&self) -> Option<ConstrId> {
        self.pin
    }

    pub(crate) fn set_pin(&mut self, ground_truth: GroundTruth, pin: Option<ConstrId>) {
        self.ground_truth = ground_truth;
        self.pin = pin;
    }

    /// Constraint owned by this assignment
    ///
    /// Exits with hypotheses above them produce
    /// `|Hup| * x + sum(non-exit right(Hup)) <= |Hup|`: an exit forbids every
    /// cell above from continuing. Mappings, divisions and exits with an empty
    /// `Hup` have none.
    pub fn structural_constraint(
        &self,
        ledger: &AssignmentsAndHypotheses,
        neighborhoods: &HypothesisNeighborhoods,
    ) -> Option<StructuralConstraint> {
        let AssignmentEdge::Exit { hup, .. } = &self.edge else {
            return None;
        };
        if hup.is_empty() {
            return None;
        }

        let bound = hup.len() as f64;
        let mut expr = LinExpr::new().with_term(bound, self.var);
        for &upper in hup {
            for &other in neighborhoods.right(upper) {
                match ledger.assignment(other) {
                    Some(a) if a.kind() != AssignmentKind::Exit => expr.add_term(1.0, a.var()),
                    _ => {}
                }
            }
        }

        Some(StructuralConstraint {
            expr,
            sense: Sense::LessEqual,
            rhs: bound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_endpoints() {
        let exit = AssignmentEdge::Exit {
            who: HypothesisId(3),
            hup: vec![HypothesisId(1)],
        };
        assert_eq!(exit.kind(), AssignmentKind::Exit);
        assert_eq!(exit.endpoints().as_slice(), &[HypothesisId(3)]);
        assert!(exit.destinations().is_empty());

        let div = AssignmentEdge::Division {
            from: HypothesisId(0),
            to_upper: HypothesisId(5),
            to_lower: HypothesisId(6),
        };
        assert_eq!(div.source(), HypothesisId(0));
        assert_eq!(
            div.endpoints().as_slice(),
            &[HypothesisId(0), HypothesisId(5), HypothesisId(6)]
        );
    }

    #[test]
    fn test_pinned_values() {
        assert_eq!(GroundTruth::Unset.pinned_value(), None);
        assert_eq!(GroundTruth::ForcedTrue.pinned_value(), Some(1.0));
        assert_eq!(GroundTruth::ForcedFalse.pinned_value(), Some(0.0));
        assert_eq!(GroundTruth::default(), GroundTruth::Unset);
    }

    #[test]
    fn test_exit_structural_constraint() {
        let mut ledger = AssignmentsAndHypotheses::new();
        let mut neighborhoods = HypothesisNeighborhoods::new();
        let (upper, lower, next) = (HypothesisId(0), HypothesisId(1), HypothesisId(2));

        // `upper` lies above `lower`; `upper` can exit or continue
        let upper_exit = ledger.add_assignment(
            0,
            VarId(0),
            AssignmentEdge::Exit {
                who: upper,
                hup: Vec::new(),
            },
        );
        let lower_exit = ledger.add_assignment(
            0,
            VarId(1),
            AssignmentEdge::Exit {
                who: lower,
                hup: vec![upper],
            },
        );
        let upper_map =
            ledger.add_assignment(0, VarId(2), AssignmentEdge::Mapping { from: upper, to: next });
        neighborhoods.add_to_right(upper, upper_exit);
        neighborhoods.add_to_right(upper, upper_map);

        let constraint = ledger
            .assignment(lower_exit)
            .and_then(|a| a.structural_constraint(&ledger, &neighborhoods))
            .unwrap();
        assert_eq!(constraint.sense, Sense::LessEqual);
        assert_eq!(constraint.rhs, 1.0);
        assert_eq!(constraint.expr.terms(), &[(VarId(1), 1.0), (VarId(2), 1.0)]);

        // no hypotheses above: nothing to constrain
        assert!(ledger
            .assignment(upper_exit)
            .and_then(|a| a.structural_constraint(&ledger, &neighborhoods))
            .is_none());
        // mappings never carry a constraint of their own
        assert!(ledger
            .assignment(upper_map)
            .and_then(|a| a.structural_constraint(&ledger, &neighborhoods))
            .is_none());
    }
}
