//! Observability for tracking ILP construction and solving.
//!
//! This module provides the [`BuildReporter`] trait. Reporters receive
//! callbacks while a growth line builds and solves its ILP, without the
//! construction code knowing what is done with them.
//!
//! - [`NoOpReporter`] - default, every callback is empty
//! - [`LoggingReporter`] - forwards events to the `log` facade
//! - [`DebugReporter`] - records every event for later inspection
//!
//! # Example
//!
//! ```
//! use growthline_tracking::reporter::{BuildReporter, DebugReporter};
//! use growthline_tracking::AssignmentKind;
//!
//! let mut reporter = DebugReporter::new();
//! reporter.on_hypotheses(0, 5);
//! reporter.on_assignments(0, AssignmentKind::Mapping, 12);
//!
//! assert_eq!(reporter.hypothesis_events(), &[(0, 5)]);
//! assert_eq!(reporter.total_events(), 2);
//! ```

use std::fmt;

use serde::Serialize;

use crate::errors::TrackingError;
use crate::ilp::{AssignmentKind, IlpStatus};

/// Constraint families of the tracking ILP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstraintFamily {
    /// Exit constraints owned by exit assignments
    Exit,
    /// Leaf-to-root path-blocking constraints
    PathBlocking,
    /// Explanation-continuity constraints
    Continuity,
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintFamily::Exit => write!(f, "exit"),
            ConstraintFamily::PathBlocking => write!(f, "path-blocking"),
            ConstraintFamily::Continuity => write!(f, "continuity"),
        }
    }
}

// ============================================================================
// BuildReporter Trait
// ============================================================================

/// Callbacks during ILP construction and solving.
///
/// All methods have default empty implementations, so you only need
/// to override the events you care about.
pub trait BuildReporter {
    /// Called after the hypotheses of one frame are created.
    fn on_hypotheses(&mut self, _time: usize, _count: usize) {}

    /// Called after one kind of assignment is added for one time step.
    fn on_assignments(&mut self, _time: usize, _kind: AssignmentKind, _count: usize) {}

    /// Called after a constraint family is complete.
    fn on_constraints(&mut self, _family: ConstraintFamily, _count: usize) {}

    /// Called after every solve, including re-solves after pin edits.
    fn on_solve(&mut self, _status: IlpStatus, _objective: Option<f64>) {}

    /// Called when construction fails and the ILP is discarded.
    fn on_build_aborted(&mut self, _error: &TrackingError) {}
}

// ============================================================================
// NoOpReporter
// ============================================================================

/// Reporter that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl NoOpReporter {
    /// Create a new no-op reporter.
    pub fn new() -> Self {
        Self
    }
}

impl BuildReporter for NoOpReporter {}

// ============================================================================
// DebugReporter
// ============================================================================

/// Reporter that records all events.
#[derive(Debug, Clone, Default)]
pub struct DebugReporter {
    /// (time, hypotheses)
    hypotheses: Vec<(usize, usize)>,

    /// (time, kind, assignments)
    assignments: Vec<(usize, AssignmentKind, usize)>,

    /// (family, constraints)
    constraints: Vec<(ConstraintFamily, usize)>,

    /// (status, objective)
    solves: Vec<(IlpStatus, Option<f64>)>,

    /// Rendered errors of aborted builds
    aborts: Vec<String>,
}

impl DebugReporter {
    /// Create a new debug reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all captured events.
    pub fn clear(&mut self) {
        self.hypotheses.clear();
        self.assignments.clear();
        self.constraints.clear();
        self.solves.clear();
        self.aborts.clear();
    }

    /// Get captured hypothesis events.
    pub fn hypothesis_events(&self) -> &[(usize, usize)] {
        &self.hypotheses
    }

    /// Get captured assignment events.
    pub fn assignment_events(&self) -> &[(usize, AssignmentKind, usize)] {
        &self.assignments
    }

    /// Get captured constraint events.
    pub fn constraint_events(&self) -> &[(ConstraintFamily, usize)] {
        &self.constraints
    }

    /// Get captured solve events.
    pub fn solve_events(&self) -> &[(IlpStatus, Option<f64>)] {
        &self.solves
    }

    /// Get rendered errors of aborted builds.
    pub fn abort_events(&self) -> &[String] {
        &self.aborts
    }

    /// Number of constraints recorded for one family
    pub fn constraints_of(&self, family: ConstraintFamily) -> usize {
        self.constraints
            .iter()
            .filter(|(f, _)| *f == family)
            .map(|(_, n)| n)
            .sum()
    }

    /// Total number of captured events across all types.
    pub fn total_events(&self) -> usize {
        self.hypotheses.len()
            + self.assignments.len()
            + self.constraints.len()
            + self.solves.len()
            + self.aborts.len()
    }
}

impl BuildReporter for DebugReporter {
    fn on_hypotheses(&mut self, time: usize, count: usize) {
        self.hypotheses.push((time, count));
    }

    fn on_assignments(&mut self, time: usize, kind: AssignmentKind, count: usize) {
        self.assignments.push((time, kind, count));
    }

    fn on_constraints(&mut self, family: ConstraintFamily, count: usize) {
        self.constraints.push((family, count));
    }

    fn on_solve(&mut self, status: IlpStatus, objective: Option<f64>) {
        self.solves.push((status, objective));
    }

    fn on_build_aborted(&mut self, error: &TrackingError) {
        self.aborts.push(error.to_string());
    }
}

// ============================================================================
// LoggingReporter
// ============================================================================

/// Reporter that logs events using the log crate.
///
/// - `on_solve`, `on_build_aborted`: INFO / ERROR
/// - `on_constraints`: DEBUG
/// - `on_hypotheses`, `on_assignments`: TRACE (DEBUG when verbose)
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReporter {
    verbose: bool,
}

impl LoggingReporter {
    /// Create a new logging reporter.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Create a logging reporter that raises per-frame events to DEBUG.
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl BuildReporter for LoggingReporter {
    fn on_hypotheses(&mut self, time: usize, count: usize) {
        if self.verbose {
            log::debug!("t={}: {} hypotheses", time, count);
        } else {
            log::trace!("t={}: {} hypotheses", time, count);
        }
    }

    fn on_assignments(&mut self, time: usize, kind: AssignmentKind, count: usize) {
        if self.verbose {
            log::debug!("t={}: {} {} assignments", time, count, kind);
        } else {
            log::trace!("t={}: {} {} assignments", time, count, kind);
        }
    }

    fn on_constraints(&mut self, family: ConstraintFamily, count: usize) {
        log::debug!("Added {} {} constraints", count, family);
    }

    fn on_solve(&mut self, status: IlpStatus, objective: Option<f64>) {
        match objective {
            Some(obj) => log::info!("Solve finished: {} (objective {:.6})", status, obj),
            None => log::info!("Solve finished: {}", status),
        }
    }

    fn on_build_aborted(&mut self, error: &TrackingError) {
        log::error!("ILP construction aborted: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_reporter() {
        let mut reporter = NoOpReporter::new();
        reporter.on_hypotheses(0, 3);
        reporter.on_solve(IlpStatus::Optimal, Some(-1.0));
    }

    #[test]
    fn test_debug_reporter_captures_events() {
        let mut reporter = DebugReporter::new();
        reporter.on_hypotheses(0, 3);
        reporter.on_hypotheses(1, 4);
        reporter.on_assignments(0, AssignmentKind::Exit, 3);
        reporter.on_constraints(ConstraintFamily::PathBlocking, 5);
        reporter.on_constraints(ConstraintFamily::PathBlocking, 2);
        reporter.on_solve(IlpStatus::Optimal, Some(-2.5));
        reporter.on_build_aborted(&TrackingError::IlpNotGenerated);

        assert_eq!(reporter.hypothesis_events().len(), 2);
        assert_eq!(reporter.constraints_of(ConstraintFamily::PathBlocking), 7);
        assert_eq!(reporter.constraints_of(ConstraintFamily::Exit), 0);
        assert_eq!(reporter.solve_events(), &[(IlpStatus::Optimal, Some(-2.5))]);
        assert_eq!(reporter.abort_events().len(), 1);
        assert_eq!(reporter.total_events(), 7);

        reporter.clear();
        assert_eq!(reporter.total_events(), 0);
    }

    #[test]
    fn test_logging_reporter_does_not_panic() {
        let mut reporter = LoggingReporter::verbose();
        reporter.on_hypotheses(0, 1);
        reporter.on_assignments(0, AssignmentKind::Division, 0);
        reporter.on_constraints(ConstraintFamily::Continuity, 1);
        reporter.on_solve(IlpStatus::Infeasible, None);
    }
}
