//! Error types for model construction, solving and result queries
//!
//! Two layers: [`SolverError`] is raised by a solver back end, and
//! [`TrackingError`] is what the tracking ILP and growth lines return.
//! Solver failures are always wrapped with the call site that triggered them.

use std::fmt;

use crate::ilp::{AssignmentId, IlpStatus};
use crate::tree::RegionKey;

/// Errors raised by a solver back end
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// A variable handle that the model never issued
    UnknownVariable {
        /// Raw index of the handle
        index: usize,
    },

    /// A constraint handle that the model never issued or already removed
    UnknownConstraint {
        /// Raw index of the handle
        index: usize,
    },

    /// Objective or constraint coefficient is NaN or infinite
    NonFiniteCoefficient {
        /// Name of the variable or constraint being added
        name: String,
    },

    /// Values were requested but the last optimize produced no solution
    NoSolution,
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::UnknownVariable { index } => {
                write!(f, "Unknown variable handle #{}", index)
            }
            SolverError::UnknownConstraint { index } => {
                write!(f, "Unknown or removed constraint handle #{}", index)
            }
            SolverError::NonFiniteCoefficient { name } => {
                write!(f, "Non-finite coefficient in '{}'", name)
            }
            SolverError::NoSolution => write!(f, "No solution available in solver model"),
        }
    }
}

impl std::error::Error for SolverError {}

/// Errors that can occur while building, solving or querying a tracking ILP
#[derive(Debug, Clone)]
pub enum TrackingError {
    /// A solver call failed; the model is in an undefined state
    Solver {
        /// What the tracking code was doing
        context: String,
        /// Underlying back-end error
        source: SolverError,
    },

    /// Reverse lookup did not find a hypothesis that must exist
    MissingHypothesis {
        /// Region that had no hypothesis
        region: RegionKey,
        /// Construction step that needed it
        context: String,
    },

    /// A region covers no positions
    EmptyRegion {
        /// Offending region
        region: RegionKey,
    },

    /// The gap-separation signal does not cover a region's interval
    SignalTooShort {
        /// Time step of the frame
        time: usize,
        /// Number of samples needed
        required: usize,
        /// Number of samples available
        actual: usize,
    },

    /// Results were requested but no usable solution exists
    NoSolution {
        /// Status of the last optimization
        status: IlpStatus,
    },

    /// Pins or costs changed since the last solve; call `resolve()` first
    StaleSolution,

    /// Time index outside of the model
    TimeOutOfRange {
        /// Requested time step
        time: usize,
        /// Number of time steps in the model
        steps: usize,
    },

    /// Assignment id that the ledger does not know
    UnknownAssignment(AssignmentId),

    /// The growth line has no tracking ILP (never generated or build failed)
    IlpNotGenerated,

    /// Configuration error
    Configuration {
        /// Description of the configuration issue
        description: String,
    },

    /// Scenario file could not be read or converted
    Scenario {
        /// Description of the problem
        description: String,
    },

    /// Results or the model could not be written out
    Export {
        /// Description of the problem
        description: String,
    },
}

impl TrackingError {
    /// Wrap a solver error with the call site that produced it
    pub fn solver(context: impl Into<String>, source: SolverError) -> Self {
        TrackingError::Solver {
            context: context.into(),
            source,
        }
    }
}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingError::Solver { context, source } => {
                write!(f, "Solver call failed ({}): {}", context, source)
            }
            TrackingError::MissingHypothesis { region, context } => {
                write!(
                    f,
                    "No hypothesis for region {} while {}",
                    region, context
                )
            }
            TrackingError::EmptyRegion { region } => {
                write!(f, "Region {} covers no positions", region)
            }
            TrackingError::SignalTooShort {
                time,
                required,
                actual,
            } => {
                write!(
                    f,
                    "Gap-separation signal at t={} too short: need {} samples, got {}",
                    time, required, actual
                )
            }
            TrackingError::NoSolution { status } => {
                write!(f, "No solution available (status: {})", status)
            }
            TrackingError::StaleSolution => {
                write!(f, "Ground-truth pins or costs changed since the last solve")
            }
            TrackingError::TimeOutOfRange { time, steps } => {
                write!(f, "Time {} out of range for {} time steps", time, steps)
            }
            TrackingError::UnknownAssignment(id) => write!(f, "Unknown assignment {}", id),
            TrackingError::IlpNotGenerated => write!(f, "Tracking ILP has not been generated"),
            TrackingError::Configuration { description } => {
                write!(f, "Configuration error: {}", description)
            }
            TrackingError::Scenario { description } => {
                write!(f, "Scenario error: {}", description)
            }
            TrackingError::Export { description } => {
                write!(f, "Export failed: {}", description)
            }
        }
    }
}

impl std::error::Error for TrackingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackingError::Solver { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeId;

    #[test]
    fn test_tracking_error_display() {
        let err = TrackingError::MissingHypothesis {
            region: RegionKey::new(3, NodeId(7)),
            context: "resolving division partner".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("t=3"));
        assert!(msg.contains("resolving division partner"));

        let err = TrackingError::SignalTooShort {
            time: 2,
            required: 12,
            actual: 10,
        };
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn test_solver_error_is_source() {
        use std::error::Error;

        let err = TrackingError::solver("adding exit variable", SolverError::NoSolution);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("adding exit variable"));
    }

    #[test]
    fn test_no_solution_mentions_status() {
        let err = TrackingError::NoSolution {
            status: IlpStatus::NeverRun,
        };
        assert!(err.to_string().contains("never run"));
    }
}
