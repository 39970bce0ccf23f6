//! Tracking ILP for one growth line
//!
//! Hypotheses are candidate regions per frame; assignments are hyperedges
//! between hypotheses of consecutive frames (exit, mapping, division), each
//! bound to one binary variable. The model minimizes the summed cost of the
//! active assignments subject to:
//!
//! - exit constraints: a cell can only exit if nothing above it continues
//! - path-blocking: at most one region per leaf-to-root chain is explained
//! - explanation continuity: every interior hypothesis has as many incoming
//!   as outgoing active assignments
//!
//! # Modules
//!
//! - [`hypothesis`] - segment hypotheses and their ids
//! - [`costs`] - unary segment cost and compatibility terms
//! - [`assignment`] - assignment sum type and ground-truth pins
//! - [`ledger`] - per-time storage with reverse region lookup
//! - [`neighborhoods`] - left/right assignment sets per hypothesis
//! - [`tracking`] - model construction, solving and queries

pub mod assignment;
pub mod costs;
pub mod hypothesis;
pub mod ledger;
pub mod neighborhoods;
pub mod tracking;

pub use assignment::{Assignment, AssignmentEdge, AssignmentId, AssignmentKind, GroundTruth};
pub use hypothesis::{Hypothesis, HypothesisId};
pub use ledger::AssignmentsAndHypotheses;
pub use neighborhoods::HypothesisNeighborhoods;
pub use tracking::GrowthLineTrackingIlp;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::solver::BackendStatus;

/// Outcome of the last solve of a tracking ILP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IlpStatus {
    /// `run()` was never called
    NeverRun,
    /// Proven optimal
    Optimal,
    /// No assignment set satisfies all constraints
    Infeasible,
    /// Objective unbounded
    Unbounded,
    /// Feasible, optimality not proven
    Suboptimal,
    /// Numerical trouble in the back end
    Numeric,
    /// Node, time or other back-end limit without a usable solution
    LimitReached,
}

impl IlpStatus {
    /// True if results can be queried
    pub fn has_solution(self) -> bool {
        matches!(self, IlpStatus::Optimal | IlpStatus::Suboptimal)
    }
}

impl From<BackendStatus> for IlpStatus {
    fn from(status: BackendStatus) -> Self {
        match status {
            BackendStatus::Optimal => IlpStatus::Optimal,
            BackendStatus::Infeasible => IlpStatus::Infeasible,
            BackendStatus::Unbounded => IlpStatus::Unbounded,
            BackendStatus::Suboptimal => IlpStatus::Suboptimal,
            BackendStatus::Numeric => IlpStatus::Numeric,
            _ => IlpStatus::LimitReached,
        }
    }
}

impl fmt::Display for IlpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IlpStatus::NeverRun => "never run",
            IlpStatus::Optimal => "optimal",
            IlpStatus::Infeasible => "infeasible",
            IlpStatus::Unbounded => "unbounded",
            IlpStatus::Suboptimal => "suboptimal",
            IlpStatus::Numeric => "numeric trouble",
            IlpStatus::LimitReached => "limit reached",
        };
        f.write_str(text)
    }
}
